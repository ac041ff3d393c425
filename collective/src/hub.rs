//! The coordinator-side end of a group: forms the star and drives rounds.

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    error::{CollectiveError, Result},
    frame::{FrameReceiver, FrameSender},
    group::GroupMembership,
    lock_dim,
    msg::{Command, Msg, Payload},
    op::ReduceOp,
};

/// One established member connection, slotted by worker index.
struct Link<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> {
    id: String,
    rx: FrameReceiver<R>,
    tx: FrameSender<W>,
    buf: Vec<u32>,
}

/// The coordinator-side handle of a collective group.
///
/// All rounds are rooted here: the hub fans broadcasts out and collects
/// reduce contributions in. Rounds are strictly sequential, so every member
/// observes them in the same relative order; a round only returns once each
/// member has taken part, which is what makes it a barrier.
pub struct GroupHub<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    links: Vec<Link<R, W>>,
    dim: Option<usize>,
}

impl<R, W> std::fmt::Debug for GroupHub<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupHub")
            .field("members", &self.links.len())
            .field("dim", &self.dim)
            .finish()
    }
}

impl<R, W> GroupHub<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Forms the group from one transport pair per worker.
    ///
    /// Each connection must present a `Join` frame carrying a distinct id
    /// from the membership; arrival order is irrelevant, links end up
    /// slotted by worker index.
    ///
    /// # Errors
    /// `MemberCount`, `UnknownParticipant` or `DuplicateJoin` when the
    /// connections do not line up with the membership.
    pub async fn form(membership: GroupMembership, transports: Vec<(R, W)>) -> Result<Self> {
        let expected = membership.worker_num();
        if transports.len() != expected {
            return Err(CollectiveError::MemberCount {
                expected,
                got: transports.len(),
            });
        }

        let mut slots: Vec<Option<Link<R, W>>> = Vec::with_capacity(expected);
        slots.resize_with(expected, || None);

        for (rx, tx) in transports {
            let mut rx = FrameReceiver::new(rx);
            let tx = FrameSender::new(tx);
            let mut buf = Vec::new();

            let id = match rx.recv_into(&mut buf).await? {
                Msg::Control(Command::Join { id }) => id,
                other => {
                    return Err(CollectiveError::UnexpectedFrame {
                        round: "join",
                        got: other.kind(),
                    });
                }
            };

            let Some(index) = membership.worker_index(&id) else {
                return Err(CollectiveError::UnknownParticipant { id });
            };
            if slots[index].is_some() {
                return Err(CollectiveError::DuplicateJoin { id });
            }

            debug!(id = id.as_str(), index = index; "member joined");
            slots[index] = Some(Link { id, rx, tx, buf });
        }

        // Counts matched and ids were distinct, so every slot is filled.
        let links = slots.into_iter().flatten().collect();

        Ok(Self { links, dim: None })
    }

    /// Publishes `values` to every member and waits for all receipts.
    pub async fn broadcast(&mut self, values: &[f32]) -> Result<()> {
        lock_dim(&mut self.dim, values.len())?;

        for link in &mut self.links {
            let msg = Msg::Data(Payload::Vector(values));
            link.tx.send(&msg).await?;
        }

        for link in &mut self.links {
            match link.rx.recv_into(&mut link.buf).await? {
                Msg::Control(Command::Ack) => {}
                Msg::Err(detail) => {
                    return Err(CollectiveError::Peer {
                        id: link.id.clone(),
                        detail: detail.into_owned(),
                    });
                }
                other => {
                    warn!(id = link.id.as_str(); "unexpected frame during broadcast: {}", other.kind());
                    return Err(CollectiveError::UnexpectedFrame {
                        round: "broadcast",
                        got: other.kind(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Runs one reduce round over vector contributions.
    ///
    /// Collects exactly one contribution per member, plus the receiver's
    /// own when given, combines them with `op`, then releases every member.
    ///
    /// # Returns
    /// The combined vector.
    pub async fn reduce_vector(&mut self, op: ReduceOp, own: Option<&[f32]>) -> Result<Vec<f32>> {
        let mut contributions: Vec<Vec<f32>> = Vec::with_capacity(self.links.len() + 1);
        contributions.extend(own.map(<[_]>::to_vec));

        for link in &mut self.links {
            match link.rx.recv_into(&mut link.buf).await? {
                Msg::Data(Payload::Vector(values)) => contributions.push(values.to_vec()),
                Msg::Err(detail) => {
                    return Err(CollectiveError::Peer {
                        id: link.id.clone(),
                        detail: detail.into_owned(),
                    });
                }
                other => {
                    return Err(CollectiveError::UnexpectedFrame {
                        round: "reduce",
                        got: other.kind(),
                    });
                }
            }
        }

        let combined = op.combine(&contributions)?;
        lock_dim(&mut self.dim, combined.len())?;

        self.release().await?;
        Ok(combined)
    }

    /// Runs one reduce round over scalar contributions.
    pub async fn reduce_scalar(&mut self, op: ReduceOp, own: Option<f32>) -> Result<f32> {
        let mut contributions = Vec::with_capacity(self.links.len() + 1);
        contributions.extend(own);

        for link in &mut self.links {
            match link.rx.recv_into(&mut link.buf).await? {
                Msg::Data(Payload::Scalar(value)) => contributions.push(value),
                Msg::Err(detail) => {
                    return Err(CollectiveError::Peer {
                        id: link.id.clone(),
                        detail: detail.into_owned(),
                    });
                }
                other => {
                    return Err(CollectiveError::UnexpectedFrame {
                        round: "reduce",
                        got: other.kind(),
                    });
                }
            }
        }

        let combined = op.combine_scalars(&contributions)?;
        self.release().await?;
        Ok(combined)
    }

    /// Ends the run.
    ///
    /// Notifies every member that no further rounds will come, then drains
    /// each link until the member confirms, discarding contributions that
    /// were already in flight.
    pub async fn shutdown(mut self) -> Result<()> {
        for link in &mut self.links {
            link.tx.send(&Msg::Control(Command::Shutdown)).await?;
        }

        for link in &mut self.links {
            loop {
                match link.rx.recv_into(&mut link.buf).await? {
                    Msg::Control(Command::Shutdown) => break,
                    other => {
                        debug!(id = link.id.as_str(); "discarding frame during shutdown: {}", other.kind());
                    }
                }
            }
        }

        Ok(())
    }

    /// Completes the current reduce round: every member blocked on its
    /// contribution call resumes.
    async fn release(&mut self) -> Result<()> {
        for link in &mut self.links {
            link.tx.send(&Msg::Control(Command::Done)).await?;
        }
        Ok(())
    }
}
