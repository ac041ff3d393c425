use collective::GroupMember;
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    config::WorkerConfig,
    error::{Result, WorkerErr},
    metrics::WorkerMetrics,
    partition::DataPartition,
    state::WorkerState,
};

/// Drives one worker through the synchronous optimization protocol.
///
/// Design:
/// - Keeps persistent buffers in `WorkerState`.
/// - Receives broadcasts into `state.weights` / `state.grads`.
/// - Makes no convergence decision of its own: the run ends when the hub
///   stops issuing rounds, observed at any blocking point.
pub struct WorkerLoop {
    cfg: WorkerConfig,
    partition: DataPartition,
    state: WorkerState,
    metrics: WorkerMetrics,
}

impl WorkerLoop {
    pub fn new(cfg: WorkerConfig, partition: DataPartition) -> Self {
        Self {
            cfg,
            partition,
            state: WorkerState::new(),
            metrics: WorkerMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }

    /// Runs for up to `cfg.iter_num` iterations, or until the hub ends the
    /// run, whichever comes first.
    ///
    /// # Arguments
    /// * `group` - This worker's joined end of the collective group.
    ///
    /// # Returns
    /// The worker metrics on graceful completion.
    ///
    /// # Errors
    /// Returns `WorkerErr` on I/O failures or protocol violations.
    pub async fn run<R, W>(mut self, mut group: GroupMember<R, W>) -> Result<WorkerMetrics>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        // Iteration 0 setup: adopt the initial weights. This also fixes the
        // vector length for the whole run.
        if group
            .recv_broadcast(&mut self.state.weights)
            .await?
            .is_none()
        {
            return Ok(self.metrics);
        }

        let dim = self.partition.dim();
        if self.state.weights.len() != dim {
            let err = WorkerErr::DimensionMismatch {
                expected: dim,
                got: self.state.weights.len(),
            };
            group.report(&err.to_string()).await?;
            return Err(err);
        }
        self.state.grads.resize(dim, 0.0);

        let lr = self.cfg.learning_rate();

        for iteration in 0..self.cfg.iter_num() {
            // 1) Local gradient from the partition and the current weights.
            self.partition
                .gradient(&self.state.weights, &mut self.state.grads);
            if group
                .contribute_vector(&self.state.grads)
                .await?
                .is_none()
            {
                break;
            }

            // 2) Adopt the summed global gradient. Reuses the gradient
            //    buffer; the local gradient is already contributed.
            if group
                .recv_broadcast(&mut self.state.grads)
                .await?
                .is_none()
            {
                break;
            }

            // 3) Step the local copy, then offer it to the averaging round.
            for (w, g) in self.state.weights.iter_mut().zip(&self.state.grads) {
                *w -= lr * g;
            }
            if group
                .contribute_vector(&self.state.weights)
                .await?
                .is_none()
            {
                break;
            }

            // 4) The averaged weights overwrite the local copy wholesale.
            if group
                .recv_broadcast(&mut self.state.weights)
                .await?
                .is_none()
            {
                break;
            }

            // 5) Local loss at the adopted weights.
            let error = self.partition.error(&self.state.weights);
            debug!(iteration = iteration, error = error; "contributing local error");
            if group.contribute_scalar(error).await?.is_none() {
                break;
            }

            self.metrics.bump_iteration();
        }

        group.await_shutdown().await?;
        info!(iterations = self.metrics.iterations; "worker finished");

        Ok(self.metrics)
    }
}
