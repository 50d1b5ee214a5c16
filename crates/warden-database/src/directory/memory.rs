//! In-memory user directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use warden_core::types::UserId;
use warden_core::{AppError, AppResult};
use warden_entity::LocalUser;

use super::UserDirectory;

/// User directory held in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    /// `(domain, external_id)` → user.
    users: DashMap<(String, String), LocalUser>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user is stored.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn save_or_update(&self, user: &LocalUser) -> AppResult<LocalUser> {
        let key = (user.domain.clone(), user.external_id.clone());
        let mut entry = self.users.entry(key).or_insert_with(|| user.clone());

        let stored = entry.value_mut();
        let id = stored.id;
        let admin = stored.admin;
        let last_admin_check = stored.last_admin_check;
        *stored = LocalUser {
            id,
            admin,
            last_admin_check,
            ..user.clone()
        };

        debug!(user_id = %id, login = %stored.login_name, "Saved local user");
        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<LocalUser>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_external_id(
        &self,
        domain: &str,
        external_id: &str,
    ) -> AppResult<Option<LocalUser>> {
        Ok(self
            .users
            .get(&(domain.to_string(), external_id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn update_last_admin_check(
        &self,
        id: UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut entry = self
            .users
            .iter_mut()
            .find(|entry| entry.value().id == id)
            .ok_or_else(|| AppError::not_found(format!("Local user {id} not found")))?;
        let user = entry.value_mut();
        user.admin = admin;
        user.last_admin_check = Some(at);
        Ok(())
    }
}
