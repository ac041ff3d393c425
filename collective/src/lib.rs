//! Synchronous collective operations over a fixed participant group.
//!
//! One coordinator hub and N worker members form a star. Rounds are
//! strictly sequential: a broadcast completes once every member has
//! acknowledged the value, a reduce completes once every contribution has
//! arrived and the hub has released the round. That completion is the only
//! synchronization between participants.

mod error;
mod frame;
mod group;
mod hub;
mod member;
mod msg;
mod op;

use tokio::io::{AsyncRead, AsyncWrite};

pub use error::{CollectiveError, Result};
pub use frame::{Align4, FrameReceiver, FrameSender, WireDecode, WireEncode};
pub use group::{COORDINATOR_ID, GroupMembership, Role};
pub use hub::GroupHub;
pub use member::GroupMember;
pub use msg::{Command, Msg, Payload};
pub use op::ReduceOp;

/// Creates both framed ends over a raw transport pair.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// The receiving and sending halves of the framed channel.
pub fn channel<R, W>(rx: R, tx: W) -> (FrameReceiver<R>, FrameSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (FrameReceiver::new(rx), FrameSender::new(tx))
}

/// The first vector seen on a handle fixes the run's dimension; every later
/// vector must match it.
pub(crate) fn lock_dim(slot: &mut Option<usize>, len: usize) -> Result<()> {
    match *slot {
        None => {
            *slot = Some(len);
            Ok(())
        }
        Some(dim) if dim == len => Ok(()),
        Some(dim) => Err(CollectiveError::Vector(
            vecmath::VectorError::LengthMismatch {
                expected: dim,
                got: len,
            },
        )),
    }
}
