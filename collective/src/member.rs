//! The worker-side end of a group.

use std::borrow::Cow;

use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    error::{CollectiveError, Result},
    frame::{FrameReceiver, FrameSender},
    group::{COORDINATOR_ID, Role},
    lock_dim,
    msg::{Command, Msg, Payload},
};

/// The member-side handle of a collective group.
///
/// Each call takes part in exactly one round and blocks until the hub
/// completes it. A `None` result means the hub ended the run instead of
/// issuing the round; the handle answers `None` to everything afterwards.
pub struct GroupMember<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    id: String,
    rx: FrameReceiver<R>,
    tx: FrameSender<W>,
    buf: Vec<u32>,
    dim: Option<usize>,
    closed: bool,
}

impl<R, W> GroupMember<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Joins the group under `role`'s identity.
    pub async fn join(role: Role, rx: R, tx: W) -> Result<Self> {
        let id = role.id();
        let mut tx = FrameSender::new(tx);

        let msg = Msg::Control(Command::Join { id: id.clone() });
        tx.send(&msg).await?;
        debug!(id = id.as_str(); "joined group");

        Ok(Self {
            id,
            rx: FrameReceiver::new(rx),
            tx,
            buf: Vec::new(),
            dim: None,
            closed: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Receives the next broadcast value into `out`.
    ///
    /// # Returns
    /// `None` if the hub ended the run instead.
    pub async fn recv_broadcast(&mut self, out: &mut Vec<f32>) -> Result<Option<()>> {
        if self.closed {
            return Ok(None);
        }

        let received = match self.rx.recv_into(&mut self.buf).await? {
            Msg::Data(Payload::Vector(values)) => {
                out.clear();
                out.extend_from_slice(values);
                true
            }
            Msg::Control(Command::Shutdown) => false,
            other => {
                return Err(CollectiveError::UnexpectedFrame {
                    round: "broadcast",
                    got: other.kind(),
                });
            }
        };

        if !received {
            self.acknowledge_shutdown().await?;
            return Ok(None);
        }

        lock_dim(&mut self.dim, out.len())?;
        self.tx.send(&Msg::Control(Command::Ack)).await?;
        Ok(Some(()))
    }

    /// Contributes to the current vector reduce and blocks until the hub
    /// completes the round.
    ///
    /// # Returns
    /// `None` if the hub ended the run instead.
    pub async fn contribute_vector(&mut self, values: &[f32]) -> Result<Option<()>> {
        if self.closed {
            return Ok(None);
        }

        lock_dim(&mut self.dim, values.len())?;
        let msg = Msg::Data(Payload::Vector(values));
        self.tx.send(&msg).await?;
        self.await_done().await
    }

    /// Scalar counterpart of [`contribute_vector`](Self::contribute_vector).
    pub async fn contribute_scalar(&mut self, value: f32) -> Result<Option<()>> {
        if self.closed {
            return Ok(None);
        }

        self.tx.send(&Msg::Data(Payload::Scalar(value))).await?;
        self.await_done().await
    }

    /// Reports a fatal local failure to the hub; its current round surfaces
    /// it as a peer error.
    pub async fn report(&mut self, detail: &str) -> Result<()> {
        let msg = Msg::Err(Cow::Borrowed(detail));
        Ok(self.tx.send(&msg).await?)
    }

    /// Waits for the hub's end-of-run notice after the member's last round.
    pub async fn await_shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        match self.rx.recv_into(&mut self.buf).await? {
            Msg::Control(Command::Shutdown) => {}
            other => {
                return Err(CollectiveError::UnexpectedFrame {
                    round: "shutdown",
                    got: other.kind(),
                });
            }
        }

        self.acknowledge_shutdown().await?;
        info!(id = self.id.as_str(); "group shut down");
        Ok(())
    }

    async fn await_done(&mut self) -> Result<Option<()>> {
        let done = match self.rx.recv_into(&mut self.buf).await? {
            Msg::Control(Command::Done) => true,
            Msg::Control(Command::Shutdown) => false,
            Msg::Err(detail) => {
                return Err(CollectiveError::Peer {
                    id: COORDINATOR_ID.to_string(),
                    detail: detail.into_owned(),
                });
            }
            other => {
                return Err(CollectiveError::UnexpectedFrame {
                    round: "reduce",
                    got: other.kind(),
                });
            }
        };

        if done {
            Ok(Some(()))
        } else {
            self.acknowledge_shutdown().await?;
            Ok(None)
        }
    }

    async fn acknowledge_shutdown(&mut self) -> Result<()> {
        self.closed = true;
        Ok(self.tx.send(&Msg::Control(Command::Shutdown)).await?)
    }
}
