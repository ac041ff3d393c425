use std::{error::Error, fmt, io};

use vecmath::VectorError;

/// The collective module's result type.
pub type Result<T> = std::result::Result<T, CollectiveError>;

/// Failures of group formation or of a collective round.
#[derive(Debug)]
pub enum CollectiveError {
    Io(io::Error),
    /// A group must contain at least one worker.
    EmptyGroup,
    /// A connection presented an id outside the membership.
    UnknownParticipant { id: String },
    /// Two connections presented the same id.
    DuplicateJoin { id: String },
    /// Formation was attempted with the wrong number of connections.
    MemberCount { expected: usize, got: usize },
    /// A round received a frame of the wrong kind.
    UnexpectedFrame {
        round: &'static str,
        got: &'static str,
    },
    /// A peer reported a failure through an error frame.
    Peer { id: String, detail: String },
    /// Aggregation failed over the supplied contributions.
    Vector(VectorError),
}

impl fmt::Display for CollectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectiveError::Io(e) => write!(f, "io error: {e}"),
            CollectiveError::EmptyGroup => write!(f, "group must contain at least one worker"),
            CollectiveError::UnknownParticipant { id } => {
                write!(f, "unknown participant: {id}")
            }
            CollectiveError::DuplicateJoin { id } => {
                write!(f, "participant joined twice: {id}")
            }
            CollectiveError::MemberCount { expected, got } => {
                write!(f, "member count mismatch: expected {expected}, got {got}")
            }
            CollectiveError::UnexpectedFrame { round, got } => {
                write!(f, "unexpected frame during {round} round: got {got}")
            }
            CollectiveError::Peer { id, detail } => {
                write!(f, "peer {id} reported an error: {detail}")
            }
            CollectiveError::Vector(e) => write!(f, "aggregation error: {e}"),
        }
    }
}

impl Error for CollectiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CollectiveError::Io(e) => Some(e),
            CollectiveError::Vector(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CollectiveError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<VectorError> for CollectiveError {
    fn from(value: VectorError) -> Self {
        Self::Vector(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<CollectiveError> for io::Error {
    fn from(value: CollectiveError) -> Self {
        match value {
            CollectiveError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
