use collective::{GroupHub, ReduceOp};
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    config::RunConfig,
    error::{CoordinatorError, Result},
    record::{IterationRecord, RunOutcome, RunSummary},
    sink::RecordSink,
};

/// Drives the optimization rounds from the hub side of the group.
///
/// Round order per iteration: gradient-sum reduce, gradient broadcast,
/// weight-average reduce, weight broadcast, convergence check, error-sum
/// reduce. The loop stops early when the averaged weights turn non-finite;
/// that is a recognized terminal state, not a fault.
pub struct Coordinator<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    cfg: RunConfig,
    hub: GroupHub<R, W>,
}

impl<R, W> Coordinator<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new coordinator over an already-formed group.
    ///
    /// # Arguments
    /// * `cfg` - Validated run bounds.
    /// * `hub` - The hub side of the collective group, one link per worker.
    pub fn new(cfg: RunConfig, hub: GroupHub<R, W>) -> Self {
        Self { cfg, hub }
    }

    /// Runs the full optimization.
    ///
    /// `initial_weights` is broadcast once before iteration 0 and fixes the
    /// vector length for the run. Workers adopt every weight broadcast
    /// wholesale, so the returned records describe the state every
    /// participant agreed on.
    ///
    /// # Returns
    /// One record per executed iteration, in iteration order.
    ///
    /// # Errors
    /// Structural failures only: channel errors, aggregation over
    /// inconsistent lengths, sink I/O.
    pub async fn run<S>(
        mut self,
        initial_weights: &[f32],
        sink: &mut S,
    ) -> Result<Vec<IterationRecord>>
    where
        S: RecordSink,
    {
        if initial_weights.is_empty() {
            return Err(CoordinatorError::EmptyInitialWeights);
        }

        info!(
            worker_num = self.cfg.worker_num(),
            iter_num = self.cfg.iter_num();
            "starting optimization"
        );
        self.hub.broadcast(initial_weights).await?;

        let iter_num = self.cfg.iter_num();
        let mut records = Vec::with_capacity(iter_num);
        let mut outcome = RunOutcome::IterationLimit;

        for index in 0..iter_num {
            debug!(iteration = index; "awaiting gradient reduce");
            let global_gradient = self.hub.reduce_vector(ReduceOp::Sum, None).await?;
            self.hub.broadcast(&global_gradient).await?;

            debug!(iteration = index; "awaiting weight reduce");
            let global_weights = self.hub.reduce_vector(ReduceOp::Average, None).await?;
            self.hub.broadcast(&global_weights).await?;

            if vecmath::has_nan(&global_weights) {
                info!(iteration = index; "non-finite weights, terminating early");

                let record = IterationRecord {
                    index,
                    weights: global_weights,
                    total_error: None,
                    converged: true,
                };
                sink.append(&record).map_err(CoordinatorError::Sink)?;
                records.push(record);

                outcome = RunOutcome::Converged { iteration: index };
                break;
            }

            let total_error = self.hub.reduce_scalar(ReduceOp::Sum, None).await?;
            info!(iteration = index, total_error = total_error; "iteration complete");

            let record = IterationRecord {
                index,
                weights: global_weights,
                total_error: Some(total_error),
                converged: false,
            };
            sink.append(&record).map_err(CoordinatorError::Sink)?;
            records.push(record);
        }

        let summary = RunSummary {
            iterations: records.len(),
            outcome,
        };
        sink.finish(&summary).map_err(CoordinatorError::Sink)?;

        self.hub.shutdown().await?;

        Ok(records)
    }
}
