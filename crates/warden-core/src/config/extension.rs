//! Configuration of the built-in extensions.

use serde::{Deserialize, Serialize};

/// Built-in extension instances registered at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Config-backed directories providing both an authenticator and an authorizer.
    #[serde(default)]
    pub internal: Vec<InternalDirectoryConfig>,
    /// Suffix-stripping mappers.
    #[serde(default)]
    pub mappers: Vec<MapperConfig>,
}

/// A directory whose users and groups are declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalDirectoryConfig {
    /// Directory name. The authenticator registers as `{name}-authn` and the
    /// authorizer as `{name}-authz`.
    pub name: String,
    /// Lifetime in minutes stamped into `VALID_TO` of issued auth records.
    #[serde(default)]
    pub record_ttl_minutes: Option<u32>,
    /// Declared users.
    #[serde(default)]
    pub users: Vec<InternalUserConfig>,
    /// Declared groups.
    #[serde(default)]
    pub groups: Vec<InternalGroupConfig>,
}

impl InternalDirectoryConfig {
    /// Registry name of the authenticator half.
    pub fn authn_name(&self) -> String {
        format!("{}-authn", self.name)
    }

    /// Registry name of the authorizer half.
    pub fn authz_name(&self) -> String {
        format!("{}-authz", self.name)
    }
}

/// A user of an internal directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalUserConfig {
    /// Login name.
    pub name: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Group names the user belongs to.
    #[serde(default)]
    pub groups: Vec<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Account disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Account locked.
    #[serde(default)]
    pub locked: bool,
    /// Password must be changed before logging in.
    #[serde(default)]
    pub password_expired: bool,
    /// Where the user can change an expired password.
    #[serde(default)]
    pub change_url: Option<String>,
}

/// A group of an internal directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalGroupConfig {
    /// Group name.
    pub name: String,
    /// Parent groups, flattened into members' group sets.
    #[serde(default)]
    pub member_of: Vec<String>,
}

/// A mapper that strips a domain suffix from user names and optionally
/// lowercases principals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Registry name.
    pub name: String,
    /// Suffix removed from user names before authentication (e.g. `"@corp"`).
    #[serde(default)]
    pub strip_suffix: Option<String>,
    /// Lowercase the principal of authenticated records.
    #[serde(default)]
    pub lowercase: bool,
}
