//! Task submission.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use warden_core::AppResult;
use warden_core::config::WorkerConfig;

use crate::runner::WorkerRunner;

/// A unit of fire-and-forget work.
#[async_trait]
pub trait BackgroundTask: Send + Sync + std::fmt::Debug {
    /// Task name used in logs.
    fn name(&self) -> &str;

    /// Runs the task.
    async fn run(&self) -> AppResult<()>;
}

/// Handle for submitting background tasks. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BackgroundExecutor {
    sender: mpsc::Sender<Arc<dyn BackgroundTask>>,
}

impl BackgroundExecutor {
    /// Creates the executor and spawns its runner. The runner stops when
    /// `cancel` turns true or every executor handle is dropped.
    pub fn start(config: &WorkerConfig, cancel: watch::Receiver<bool>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let runner = WorkerRunner::new(receiver, config.concurrency.max(1));
        let handle = tokio::spawn(async move { runner.run(cancel).await });
        (Self { sender }, handle)
    }

    /// Queues a task without waiting. Returns `false` when the task was
    /// dropped because the queue is full or the runner has stopped.
    pub fn submit(&self, task: Arc<dyn BackgroundTask>) -> bool {
        match self.sender.try_send(task) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(task)) => {
                warn!(task = %task.name(), "Background queue full, dropping task");
                false
            }
            Err(mpsc::error::TrySendError::Closed(task)) => {
                warn!(task = %task.name(), "Background runner stopped, dropping task");
                false
            }
        }
    }
}
