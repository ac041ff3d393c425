//! Local training data and the linear-regression local computations.

use crate::error::{Result, WorkerErr};

/// One worker's private slice of the training data.
///
/// Rows are stored flat: `dim` feature values per sample in `features`,
/// one target per sample in `targets`. Opaque to the coordination layer;
/// only the gradient and error it produces ever leave the worker.
#[derive(Debug, Clone)]
pub struct DataPartition {
    dim: usize,
    features: Vec<f32>,
    targets: Vec<f32>,
}

impl DataPartition {
    /// Builds a partition from flat row-major features and per-row targets.
    ///
    /// # Errors
    /// `PartitionShape` if the partition is empty or `features` does not
    /// divide into `targets.len()` rows of `dim` values.
    pub fn new(dim: usize, features: Vec<f32>, targets: Vec<f32>) -> Result<Self> {
        let rows = targets.len();
        if dim == 0 || rows == 0 || features.len() != rows * dim {
            return Err(WorkerErr::PartitionShape {
                dim,
                rows,
                features: features.len(),
            });
        }

        Ok(Self {
            dim,
            features,
            targets,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.targets.len()
    }

    /// Least-squares gradient of the local loss at `weights`, written into
    /// `out`: `Σ 2(w·x − y)x` over the partition's rows.
    ///
    /// Lengths must match the partition dimension; the worker loop checks
    /// this once against the initial broadcast.
    pub fn gradient(&self, weights: &[f32], out: &mut [f32]) {
        debug_assert_eq!(weights.len(), self.dim);
        debug_assert_eq!(out.len(), self.dim);

        out.fill(0.0);
        for (x, y) in self.features.chunks_exact(self.dim).zip(&self.targets) {
            let residual = dot(weights, x) - y;
            for (o, xi) in out.iter_mut().zip(x) {
                *o += 2.0 * residual * xi;
            }
        }
    }

    /// Local squared-error loss at `weights`: `Σ (w·x − y)²`.
    pub fn error(&self, weights: &[f32]) -> f32 {
        debug_assert_eq!(weights.len(), self.dim);

        self.features
            .chunks_exact(self.dim)
            .zip(&self.targets)
            .map(|(x, y)| {
                let residual = dot(weights, x) - y;
                residual * residual
            })
            .sum()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}
