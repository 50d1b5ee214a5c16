//! Session issuance and eviction configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in minutes. `0` means unlimited; an
    /// authenticator-supplied expiry may still bound the session.
    #[serde(default = "default_hard_limit")]
    pub hard_limit_minutes: u32,
    /// Idle timeout in minutes after which the cleanup loop evicts a
    /// session. `0` disables idle eviction.
    #[serde(default = "default_soft_limit")]
    pub soft_limit_minutes: u32,
    /// Interval between cleanup passes in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Whether the plaintext password of a credentials login is kept in the
    /// session for nested logons.
    #[serde(default = "default_true")]
    pub retain_password: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hard_limit_minutes: default_hard_limit(),
            soft_limit_minutes: default_soft_limit(),
            cleanup_interval_seconds: default_cleanup_interval(),
            retain_password: default_true(),
        }
    }
}

fn default_hard_limit() -> u32 {
    600
}

fn default_soft_limit() -> u32 {
    30
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}
