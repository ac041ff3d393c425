use std::{error::Error, fmt, num::NonZeroUsize};

/// Startup-time run parameters, validated before any connection exists.
#[derive(Debug, Clone)]
pub struct RunConfig {
    worker_num: NonZeroUsize,
    iter_num: NonZeroUsize,
}

/// A rejected run configuration; the run never begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NonPositiveWorkerNum,
    NonPositiveIterNum,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveWorkerNum => write!(f, "worker_num must be positive"),
            ConfigError::NonPositiveIterNum => write!(f, "iter_num must be positive"),
        }
    }
}

impl Error for ConfigError {}

impl RunConfig {
    /// Creates a new run configuration.
    ///
    /// # Arguments
    /// * `worker_num` - Number of workers the group will contain.
    /// * `iter_num` - Number of optimization iterations to drive.
    ///
    /// # Errors
    /// `ConfigError` when either bound is zero.
    pub fn new(worker_num: usize, iter_num: usize) -> Result<Self, ConfigError> {
        let worker_num =
            NonZeroUsize::new(worker_num).ok_or(ConfigError::NonPositiveWorkerNum)?;
        let iter_num = NonZeroUsize::new(iter_num).ok_or(ConfigError::NonPositiveIterNum)?;

        Ok(Self {
            worker_num,
            iter_num,
        })
    }

    pub fn worker_num(&self) -> usize {
        self.worker_num.get()
    }

    pub fn iter_num(&self) -> usize {
        self.iter_num.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_bounds() {
        let cfg = RunConfig::new(2, 3).unwrap();
        assert_eq!(cfg.worker_num(), 2);
        assert_eq!(cfg.iter_num(), 3);
    }

    #[test]
    fn rejects_non_positive_bounds() {
        assert_eq!(
            RunConfig::new(0, 3).unwrap_err(),
            ConfigError::NonPositiveWorkerNum
        );
        assert_eq!(
            RunConfig::new(2, 0).unwrap_err(),
            ConfigError::NonPositiveIterNum
        );
    }
}
