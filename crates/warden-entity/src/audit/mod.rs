//! Audit log entries and accounting reports emitted by the login flow.

pub mod accounting;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use accounting::{AccountingReport, ReportReason};

/// Audit event types the login flow produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditLogType {
    /// Terminal entry of a successful login.
    UserLogin,
    /// Terminal entry of a failed login.
    UserLoginFailed,
    /// Credentials were accepted but have expired.
    UserAccountPasswordExpired,
    /// Unknown user or wrong password.
    AuthFailedInvalidCredentials,
    /// Account locked, disabled or the authenticator timed out.
    UserAccountDisabledOrLocked,
    /// Account expired.
    UserAccountExpired,
}

impl AuditLogType {
    /// Stable code used in logs and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserLogin => "USER_VDC_LOGIN",
            Self::UserLoginFailed => "USER_VDC_LOGIN_FAILED",
            Self::UserAccountPasswordExpired => "USER_ACCOUNT_PASSWORD_EXPIRED",
            Self::AuthFailedInvalidCredentials => "AUTH_FAILED_INVALID_CREDENTIALS",
            Self::UserAccountDisabledOrLocked => "USER_ACCOUNT_DISABLED_OR_LOCKED",
            Self::UserAccountExpired => "USER_ACCOUNT_EXPIRED",
        }
    }

    /// Whether this type closes a login attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::UserLogin | Self::UserLoginFailed)
    }
}

impl fmt::Display for AuditLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// User name the event is recorded against.
    pub user_name: String,
    /// Event type.
    pub log_type: AuditLogType,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry stamped now.
    pub fn new(user_name: impl Into<String>, log_type: AuditLogType) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_name: user_name.into(),
            log_type,
            created_at: Utc::now(),
        }
    }
}
