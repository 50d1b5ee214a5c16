//! Wrapper for sensitive values such as passwords.
//!
//! A [`Secret`] never prints its contents: `Debug`, `Display` and
//! `Serialize` all emit [`REDACTED`]. The inner value is zeroized on drop
//! and must be read through an explicit [`Secret::expose`] call.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// A wrapper for sensitive values that prevents accidental exposure.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
    T: Zeroize,
{
    inner: T,
}

/// Secret strings, the common case for credentials.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
    T: Zeroize,
{
    /// Wrap a value.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Explicitly access the inner value.
    pub fn expose(&self) -> &T {
        &self.inner
    }
}

impl SecretString {
    /// Whether the wrapped string is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> Clone for Secret<T>
where
    T: Zeroize + Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&REDACTED).finish()
    }
}

impl<T> fmt::Display for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> PartialEq for Secret<T>
where
    T: Zeroize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl<T> Serialize for Secret<T>
where
    T: Zeroize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de, T> Deserialize<'de> for Secret<T>
where
    T: Zeroize + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Secret::new)
    }
}
