//! Background bookkeeping worker configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the fire-and-forget background executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Capacity of the task queue. Tasks submitted to a full queue are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Number of tasks allowed to run concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_concurrency() -> usize {
    4
}
