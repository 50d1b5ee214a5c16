//! Bookkeeping tasks submitted after logins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::AppResult;
use warden_core::types::UserId;
use warden_database::UserDirectory;

use crate::executor::BackgroundTask;

/// Persists a user's admin flag and the time it was evaluated.
#[derive(Debug)]
pub struct RecordAdminCheck {
    directory: Arc<dyn UserDirectory>,
    user_id: UserId,
    admin: bool,
    at: DateTime<Utc>,
}

impl RecordAdminCheck {
    /// Creates the task.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        user_id: UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            directory,
            user_id,
            admin,
            at,
        }
    }
}

#[async_trait]
impl BackgroundTask for RecordAdminCheck {
    fn name(&self) -> &str {
        "record_admin_check"
    }

    async fn run(&self) -> AppResult<()> {
        self.directory
            .update_last_admin_check(self.user_id, self.admin, self.at)
            .await
    }
}
