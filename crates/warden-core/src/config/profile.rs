//! Authentication profile configuration.

use serde::{Deserialize, Serialize};

/// A named authentication profile binding extensions together.
///
/// Extension names refer to entries registered in the extension registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile name presented to users (e.g. `"internal"`).
    pub name: String,
    /// Name of the authenticator extension.
    pub authn: String,
    /// Name of the authorizer extension.
    pub authz: String,
    /// Optional name of the mapper extension.
    #[serde(default)]
    pub mapper: Option<String>,
}
