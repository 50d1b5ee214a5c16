//! Session artifacts stored per token.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use warden_core::types::SecretString;

use crate::record::{AuthRecord, PrincipalRecord};
use crate::user::LocalUser;

/// Everything attached to a session token.
///
/// Fields are filled in one by one by the session issuer; a session with no
/// user is still under construction.
#[derive(Debug, Clone, Serialize)]
pub struct SessionData {
    /// The owning local user.
    pub user: Option<LocalUser>,
    /// Name of the profile used to log in.
    pub profile_name: Option<String>,
    /// Authentication record of the login.
    pub auth_record: Option<AuthRecord>,
    /// Principal record of the login.
    pub principal_record: Option<PrincipalRecord>,
    /// Retained plaintext credential, redacted on output.
    pub password: Option<SecretString>,
    /// Absolute expiry; `None` means unlimited.
    pub hard_limit: Option<DateTime<Utc>>,
    /// When the session entry was created.
    pub created_at: DateTime<Utc>,
    /// Last bookkeeping refresh.
    pub last_seen: DateTime<Utc>,
}

impl SessionData {
    /// Empty session created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            user: None,
            profile_name: None,
            auth_record: None,
            principal_record: None,
            password: None,
            hard_limit: None,
            created_at: now,
            last_seen: now,
        }
    }

    /// Whether the hard limit has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.hard_limit.is_some_and(|limit| now >= limit)
    }

    /// Whether the session has been idle longer than `soft_limit`.
    /// A zero soft limit disables idle expiry.
    pub fn is_idle(&self, now: DateTime<Utc>, soft_limit: Duration) -> bool {
        soft_limit > Duration::zero() && now - self.last_seen > soft_limit
    }
}
