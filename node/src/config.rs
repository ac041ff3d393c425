//! On-disk node configuration: which role this process plays and where its
//! peers are. Role assignment is decided by whoever provisions the run;
//! this process only consumes it.

use std::io;

use serde::Deserialize;

/// Per-node configuration, tagged by role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum NodeConfig {
    Coordinator(CoordinatorConfig),
    Worker(WorkerNodeConfig),
}

#[derive(Debug, Deserialize)]
pub struct CoordinatorConfig {
    pub listen_addr: String,
    pub worker_num: usize,
    pub iter_num: usize,
    /// Weight-vector length; initial weights are zeros of this dimension.
    pub dim: usize,
    pub output_path: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkerNodeConfig {
    pub index: usize,
    pub coordinator_addr: String,
    pub iter_num: usize,
    pub learning_rate: f32,
    pub dataset: DatasetConfig,
}

/// Where a worker's private partition comes from.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DatasetConfig {
    /// Flat rows of `x_size` feature values followed by one target.
    Inline { data: Vec<f32>, x_size: usize },
    /// Seeded generation around known true weights, with uniform noise.
    Synthetic {
        true_weights: Vec<f32>,
        samples: usize,
        seed: u64,
        noise: f32,
    },
}

/// Loads a [`NodeConfig`] from a JSON file.
///
/// # Errors
/// An `io::Error` if the file cannot be read or parsed.
pub fn load(path: &str) -> io::Result<NodeConfig> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::from)
}
