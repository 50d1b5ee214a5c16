//! Accounting reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{AuthRecord, PrincipalRecord};

/// Why an accounting report was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    /// Successful login through submitted credentials.
    CredentialsLogin,
    /// Successful login through a negotiated auth record.
    NegotiateLogin,
    /// The authorizer has no record of the principal.
    PrincipalNotFound,
    /// The user may not log in.
    LoginNoPermission,
}

/// A report delivered to accounting sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Report reason.
    pub reason: ReportReason,
    /// Name of the authorizer of the profile.
    pub authz_name: String,
    /// Login name as submitted, when there was one.
    pub login_name: Option<String>,
    /// Authentication record of the attempt.
    pub auth_record: AuthRecord,
    /// Principal record, once resolved.
    pub principal_record: Option<PrincipalRecord>,
    /// Human-readable description.
    pub message: String,
    /// When the report was produced.
    pub created_at: DateTime<Utc>,
}

impl AccountingReport {
    /// Creates a report stamped now.
    pub fn new(
        reason: ReportReason,
        authz_name: impl Into<String>,
        login_name: Option<String>,
        auth_record: AuthRecord,
        principal_record: Option<PrincipalRecord>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reason,
            authz_name: authz_name.into(),
            login_name,
            auth_record,
            principal_record,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
