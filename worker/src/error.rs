use std::{error::Error, fmt, io};

use collective::CollectiveError;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker runtime failures.
#[derive(Debug)]
pub enum WorkerErr {
    Collective(CollectiveError),
    BadConfig {
        detail: &'static str,
    },
    PartitionShape {
        dim: usize,
        rows: usize,
        features: usize,
    },
    DimensionMismatch {
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Collective(e) => write!(f, "collective error: {e}"),
            WorkerErr::BadConfig { detail } => write!(f, "bad worker config: {detail}"),
            WorkerErr::PartitionShape {
                dim,
                rows,
                features,
            } => write!(
                f,
                "partition shape mismatch: {features} feature values do not form {rows} rows of {dim}"
            ),
            WorkerErr::DimensionMismatch { expected, got } => write!(
                f,
                "weight dimension mismatch: broadcast carries {got}, partition expects {expected}"
            ),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Collective(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CollectiveError> for WorkerErr {
    fn from(value: CollectiveError) -> Self {
        Self::Collective(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Collective(e) => e.into(),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
