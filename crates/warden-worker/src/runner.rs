//! Worker runner. Drains the task queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{debug, error, info};

use crate::executor::BackgroundTask;

/// How long shutdown waits for in-flight tasks.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives submitted tasks and runs them under a concurrency limit.
#[derive(Debug)]
pub struct WorkerRunner {
    receiver: mpsc::Receiver<Arc<dyn BackgroundTask>>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl WorkerRunner {
    /// Creates a runner over `receiver`.
    pub fn new(receiver: mpsc::Receiver<Arc<dyn BackgroundTask>>, concurrency: usize) -> Self {
        Self {
            receiver,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Runs until cancelled or until every sender is gone, then waits for
    /// in-flight tasks.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        info!(concurrency = self.concurrency, "Background worker started");

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Background worker received shutdown signal");
                        break;
                    }
                }
                task = self.receiver.recv() => {
                    let Some(task) = task else { break };
                    let Ok(permit) = self.semaphore.clone().acquire_owned().await else {
                        break;
                    };
                    tokio::spawn(async move {
                        let _permit = permit;
                        match task.run().await {
                            Ok(()) => debug!(task = %task.name(), "Background task completed"),
                            Err(e) => {
                                error!(task = %task.name(), error = %e, "Background task failed")
                            }
                        }
                    });
                }
            }
        }

        self.receiver.close();
        let permits = u32::try_from(self.concurrency).unwrap_or(u32::MAX);
        let _ = tokio::time::timeout(DRAIN_TIMEOUT, self.semaphore.acquire_many(permits)).await;
        info!("Background worker stopped");
    }
}
