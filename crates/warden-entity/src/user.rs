//! Local user entity model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::types::UserId;

/// A user as known to the local directory, synchronized from a principal
/// record on every successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalUser {
    /// Local identifier, stable across updates.
    pub id: UserId,
    /// Identifier of the principal inside its directory.
    pub external_id: String,
    /// Login name.
    pub login_name: String,
    /// Directory (authorizer) the user belongs to.
    pub domain: String,
    /// Directory namespace.
    pub namespace: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Flattened group membership.
    pub group_ids: BTreeSet<String>,
    /// Administrative privileges, recomputed on every login.
    pub admin: bool,
    /// Whether the account is active locally.
    pub active: bool,
    /// Last time the admin flag was evaluated.
    pub last_admin_check: Option<DateTime<Utc>>,
}

impl LocalUser {
    /// Creates an active, non-admin user with a fresh id.
    pub fn new(
        external_id: impl Into<String>,
        login_name: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            external_id: external_id.into(),
            login_name: login_name.into(),
            domain: domain.into(),
            namespace: None,
            first_name: None,
            last_name: None,
            email: None,
            department: None,
            group_ids: BTreeSet::new(),
            admin: false,
            active: true,
            last_admin_check: None,
        }
    }

    /// `login@domain`.
    pub fn qualified_name(&self) -> String {
        format!("{}@{}", self.login_name, self.domain)
    }
}
