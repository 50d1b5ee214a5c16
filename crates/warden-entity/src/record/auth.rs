//! Authentication record produced by authenticators.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExtMap;

/// Well-known auth record keys.
pub mod keys {
    /// Identity string of the authenticated principal.
    pub const PRINCIPAL: &str = "PRINCIPAL";
    /// Absolute expiry in compact form, e.g. `20261019120000Z`.
    pub const VALID_TO: &str = "VALID_TO";
    /// The user name as typed at login.
    pub const USER: &str = "USER";
}

/// Compact timestamp layout used for `VALID_TO` (zone designator appended).
const VALID_TO_LAYOUT: &str = "%Y%m%d%H%M%S";

/// A `VALID_TO` value that does not follow the compact timestamp layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid VALID_TO '{value}': {reason}")]
pub struct ValidToError {
    /// The offending raw value.
    pub value: String,
    /// Parser message.
    pub reason: String,
}

/// An authenticator's description of a verified identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthRecord(ExtMap);

impl AuthRecord {
    /// Creates a record for the given principal.
    pub fn new(principal: impl Into<String>) -> Self {
        Self(ExtMap::new().with(keys::PRINCIPAL, principal.into()))
    }

    /// Wraps an existing map.
    pub fn from_map(map: ExtMap) -> Self {
        Self(map)
    }

    /// The authenticated principal, if present.
    pub fn principal(&self) -> Option<&str> {
        self.0.get_str(keys::PRINCIPAL)
    }

    /// Replaces the principal.
    pub fn set_principal(&mut self, principal: impl Into<String>) {
        self.0.insert(keys::PRINCIPAL, principal.into());
    }

    /// Raw `VALID_TO` string, if present.
    pub fn valid_to_raw(&self) -> Option<&str> {
        self.0.get_str(keys::VALID_TO)
    }

    /// Parsed `VALID_TO`. `None` when absent.
    pub fn valid_to(&self) -> Option<Result<DateTime<Utc>, ValidToError>> {
        self.valid_to_raw().map(parse_valid_to)
    }

    /// Builder-style `VALID_TO` setter.
    pub fn with_valid_to(mut self, valid_to: DateTime<Utc>) -> Self {
        self.0.insert(keys::VALID_TO, format_valid_to(valid_to));
        self
    }

    /// Builder-style insert of an arbitrary field.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key, value);
        self
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &ExtMap {
        &self.0
    }

    /// Mutably borrow the underlying map.
    pub fn as_map_mut(&mut self) -> &mut ExtMap {
        &mut self.0
    }

    /// Unwrap into the underlying map.
    pub fn into_map(self) -> ExtMap {
        self.0
    }
}

/// Formats a timestamp in the compact UTC `VALID_TO` form.
pub fn format_valid_to(valid_to: DateTime<Utc>) -> String {
    format!("{}Z", valid_to.format(VALID_TO_LAYOUT))
}

/// Parses a compact `VALID_TO` value: `yyyyMMddHHmmss` followed by `Z`,
/// `+hh`, `+hhmm` or `+hh:mm`.
pub fn parse_valid_to(value: &str) -> Result<DateTime<Utc>, ValidToError> {
    let invalid = |reason: String| ValidToError {
        value: value.to_string(),
        reason,
    };

    if let Some(stamp) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(stamp, VALID_TO_LAYOUT)
            .map(|naive| naive.and_utc())
            .map_err(|e| invalid(e.to_string()));
    }

    DateTime::parse_from_str(value, &format!("{VALID_TO_LAYOUT}%#z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(e.to_string()))
}
