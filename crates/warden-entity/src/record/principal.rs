//! Principal record produced by authorizers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ExtMap;

/// Well-known principal and group record keys.
pub mod keys {
    /// Stable directory identifier.
    pub const ID: &str = "ID";
    /// Display or login name.
    pub const NAME: &str = "NAME";
    /// Principal string as known to the authenticator.
    pub const PRINCIPAL: &str = "PRINCIPAL";
    /// Directory namespace (e.g. a base DN).
    pub const NAMESPACE: &str = "NAMESPACE";
    /// Given name.
    pub const FIRST_NAME: &str = "FIRST_NAME";
    /// Family name.
    pub const LAST_NAME: &str = "LAST_NAME";
    /// Email address.
    pub const EMAIL: &str = "EMAIL";
    /// Department.
    pub const DEPARTMENT: &str = "DEPARTMENT";
    /// Array of group records; groups may nest further `GROUPS`.
    pub const GROUPS: &str = "GROUPS";
}

/// An authorizer's canonical record of a principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalRecord(ExtMap);

impl PrincipalRecord {
    /// Wraps an existing map.
    pub fn from_map(map: ExtMap) -> Self {
        Self(map)
    }

    /// Directory identifier.
    pub fn id(&self) -> Option<&str> {
        self.0.get_str(keys::ID)
    }

    /// Principal name.
    pub fn name(&self) -> Option<&str> {
        self.0.get_str(keys::NAME)
    }

    /// Principal string.
    pub fn principal(&self) -> Option<&str> {
        self.0.get_str(keys::PRINCIPAL)
    }

    /// Namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.0.get_str(keys::NAMESPACE)
    }

    /// Given name.
    pub fn first_name(&self) -> Option<&str> {
        self.0.get_str(keys::FIRST_NAME)
    }

    /// Family name.
    pub fn last_name(&self) -> Option<&str> {
        self.0.get_str(keys::LAST_NAME)
    }

    /// Email address.
    pub fn email(&self) -> Option<&str> {
        self.0.get_str(keys::EMAIL)
    }

    /// Department.
    pub fn department(&self) -> Option<&str> {
        self.0.get_str(keys::DEPARTMENT)
    }

    /// Directly attached group records.
    pub fn groups(&self) -> Vec<ExtMap> {
        self.0.get_maps(keys::GROUPS)
    }

    /// Ids of every group the principal belongs to, directly or through
    /// nested groups. Groups without an `ID` are skipped but their nested
    /// groups are still visited.
    pub fn group_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        let mut pending = self.groups();

        // Copies of one group may carry different subtrees, so every node
        // is descended into and only the ids are deduplicated.
        while let Some(group) = pending.pop() {
            if let Some(id) = group.get_str(keys::ID) {
                ids.insert(id.to_string());
            }
            pending.extend(group.get_maps(keys::GROUPS));
        }

        ids
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

    /// Unwrap into the underlying map.
    pub fn into_map(self) -> ExtMap {
        self.0
    }
}
