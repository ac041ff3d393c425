/// One appended entry per executed iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub index: usize,
    pub weights: Vec<f32>,
    /// Absent when the iteration terminated on non-finite weights.
    pub total_error: Option<f32>,
    pub converged: bool,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All requested iterations completed.
    IterationLimit,
    /// Non-finite averaged weights at `iteration`; treated as a worker
    /// having converged, not as a fault.
    Converged { iteration: usize },
}

/// End-of-run summary, rendered as the sink trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of iterations that actually executed.
    pub iterations: usize,
    pub outcome: RunOutcome,
}
