/// Persistent buffers reused across iterations to avoid per-round
/// allocations.
#[derive(Debug, Default)]
pub struct WorkerState {
    /// Local copy of the shared weight vector (flat). Overwritten wholesale
    /// by every weight broadcast.
    pub weights: Vec<f32>,

    /// Gradient buffer (flat). Holds the local gradient until it is
    /// contributed, then the broadcast global gradient.
    pub grads: Vec<f32>,
}

impl WorkerState {
    /// Empty state; both buffers are sized by the initial weight broadcast.
    pub fn new() -> Self {
        Self::default()
    }
}
