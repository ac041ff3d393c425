/// Counters exposed after a run for observability and tests.
#[derive(Debug, Default, Clone)]
pub struct WorkerMetrics {
    /// Fully completed iterations, including the error contribution.
    pub iterations: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn bump_iteration(&mut self) {
        self.iterations += 1;
    }
}
