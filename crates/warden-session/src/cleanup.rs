//! Expired and idle session cleanup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use warden_core::AppResult;
use warden_core::config::SessionConfig;

use crate::store::SessionStore;

/// Handles periodic cleanup of expired and idle sessions.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Store to evict from.
    store: Arc<dyn SessionStore>,
    /// Idle limit; zero disables idle eviction.
    soft_limit: chrono::Duration,
    /// Pause between cycles.
    interval: Duration,
}

impl SessionCleanup {
    /// Creates a cleanup handler from session configuration.
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            soft_limit: chrono::Duration::minutes(i64::from(config.soft_limit_minutes)),
            interval: Duration::from_secs(config.cleanup_interval_seconds.max(1)),
        }
    }

    /// Runs one cleanup cycle. Returns the number of sessions evicted.
    pub async fn run_cleanup(&self) -> AppResult<usize> {
        let evicted = self.store.evict_expired(Utc::now(), self.soft_limit).await?;
        if evicted > 0 {
            info!(evicted = evicted, "Session cleanup completed");
        }
        Ok(evicted)
    }

    /// Runs cleanup cycles until `cancel` turns true.
    pub fn spawn_periodic(self, mut cancel: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_seconds = self.interval.as_secs(),
                "Session cleanup loop started"
            );
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cleanup().await {
                            error!(error = %e, "Session cleanup failed");
                        }
                    }
                }
            }
            info!("Session cleanup loop stopped");
        })
    }
}
