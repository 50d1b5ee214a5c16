//! Core type definitions used across the Warden workspace.

pub mod id;
pub mod secret;

pub use id::*;
pub use secret::{Secret, SecretString};
