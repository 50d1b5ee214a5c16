//! Permission table configuration for the built-in permission checker.

use serde::{Deserialize, Serialize};

/// Who may log in and who is an administrator.
///
/// Users are matched by login name, groups by external group id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Grants the login action to every user.
    #[serde(default)]
    pub allow_everyone: bool,
    /// Users granted the login action.
    #[serde(default)]
    pub login_users: Vec<String>,
    /// Groups granted the login action.
    #[serde(default)]
    pub login_groups: Vec<String>,
    /// Users with administrative privileges.
    #[serde(default)]
    pub admin_users: Vec<String>,
    /// Groups with administrative privileges.
    #[serde(default)]
    pub admin_groups: Vec<String>,
}
