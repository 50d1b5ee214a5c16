//! Key-value records exchanged with extensions.
//!
//! Extensions speak in flat maps. [`ExtMap`] is that map; [`AuthRecord`] and
//! [`PrincipalRecord`] wrap it with accessors for the well-known keys while
//! carrying any other extension-specific fields untouched.

pub mod auth;
pub mod principal;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use auth::AuthRecord;
pub use principal::PrincipalRecord;

/// A flat, JSON-valued map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtMap(Map<String, Value>);

impl ExtMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String lookup; `None` when absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Integer lookup; `None` when absent or not an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Nested map lookup; `None` when absent or not an object.
    pub fn get_map(&self, key: &str) -> Option<ExtMap> {
        match self.0.get(key) {
            Some(Value::Object(map)) => Some(ExtMap(map.clone())),
            _ => None,
        }
    }

    /// Array-of-maps lookup. Non-object elements are skipped.
    pub fn get_maps(&self, key: &str) -> Vec<ExtMap> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned().map(ExtMap))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the key is present (with any value, including null).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Converts into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Builds a map from a JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for ExtMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ExtMap> for Value {
    fn from(map: ExtMap) -> Self {
        map.into_value()
    }
}
