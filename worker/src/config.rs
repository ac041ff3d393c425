use std::num::NonZeroUsize;

use crate::error::{Result, WorkerErr};

/// Immutable execution bounds for one worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    iter_num: NonZeroUsize,
    learning_rate: f32,
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    ///
    /// # Arguments
    /// * `iter_num` - Number of optimization iterations to take part in.
    /// * `learning_rate` - Step size applied to the global gradient.
    ///
    /// # Errors
    /// `BadConfig` on a zero iteration count or a non-positive or
    /// non-finite learning rate.
    pub fn new(iter_num: usize, learning_rate: f32) -> Result<Self> {
        let Some(iter_num) = NonZeroUsize::new(iter_num) else {
            return Err(WorkerErr::BadConfig {
                detail: "iter_num must be positive",
            });
        };

        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(WorkerErr::BadConfig {
                detail: "learning_rate must be positive and finite",
            });
        }

        Ok(Self {
            iter_num,
            learning_rate,
        })
    }

    pub fn iter_num(&self) -> usize {
        self.iter_num.get()
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_bounds() {
        let cfg = WorkerConfig::new(10, 0.1).unwrap();
        assert_eq!(cfg.iter_num(), 10);
        assert_eq!(cfg.learning_rate(), 0.1);
    }

    #[test]
    fn rejects_zero_iterations() {
        assert!(matches!(
            WorkerConfig::new(0, 0.1),
            Err(WorkerErr::BadConfig { .. })
        ));
    }

    #[test]
    fn rejects_bad_learning_rates() {
        for lr in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                WorkerConfig::new(1, lr),
                Err(WorkerErr::BadConfig { .. })
            ));
        }
    }
}
