use std::{error::Error, fmt, io};

use collective::CollectiveError;

/// The coordinator module's result type.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Structural failures of an optimization run.
///
/// Numeric divergence is deliberately absent: non-finite weights end the
/// run through the normal termination path.
#[derive(Debug)]
pub enum CoordinatorError {
    Collective(CollectiveError),
    /// The initial weight vector must not be empty.
    EmptyInitialWeights,
    /// The record sink failed.
    Sink(io::Error),
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::Collective(e) => write!(f, "collective error: {e}"),
            CoordinatorError::EmptyInitialWeights => {
                write!(f, "initial weight vector must not be empty")
            }
            CoordinatorError::Sink(e) => write!(f, "record sink error: {e}"),
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CoordinatorError::Collective(e) => Some(e),
            CoordinatorError::Sink(e) => Some(e),
            CoordinatorError::EmptyInitialWeights => None,
        }
    }
}

impl From<CollectiveError> for CoordinatorError {
    fn from(value: CollectiveError) -> Self {
        Self::Collective(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<CoordinatorError> for io::Error {
    fn from(value: CoordinatorError) -> Self {
        match value {
            CoordinatorError::Collective(e) => e.into(),
            CoordinatorError::Sink(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}
