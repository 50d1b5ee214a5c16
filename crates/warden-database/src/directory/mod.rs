//! Local user directory contract and implementations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_core::AppResult;
use warden_core::types::UserId;
use warden_entity::LocalUser;

pub use memory::MemoryUserDirectory;
pub use postgres::PgUserDirectory;

/// Persistence of local users.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Creates the user or updates the row with the same
    /// `(domain, external_id)`. An existing row keeps its id, admin flag and
    /// `last_admin_check`. Returns the stored user.
    async fn save_or_update(&self, user: &LocalUser) -> AppResult<LocalUser>;

    /// Finds a user by local id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<LocalUser>>;

    /// Finds a user by directory identity.
    async fn find_by_external_id(
        &self,
        domain: &str,
        external_id: &str,
    ) -> AppResult<Option<LocalUser>>;

    /// Stores the result of an admin evaluation and when it happened.
    async fn update_last_admin_check(
        &self,
        id: UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> AppResult<()>;
}
