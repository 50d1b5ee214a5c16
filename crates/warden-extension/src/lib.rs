//! # warden-extension
//!
//! Pluggable identity components for Warden:
//!
//! - The typed extension invocation protocol and its flat-map wire form
//! - One trait per role (`Authenticator`, `Mapper`, `Authorizer`) plus an
//!   adapter for raw-map extensions
//! - The extension registry and the read-only profile repository
//! - Built-in extensions: a configuration-backed directory and a suffix mapper

pub mod builtin;
pub mod profile;
pub mod protocol;
pub mod registry;
pub mod traits;

pub use profile::{AuthenticationProfile, ProfileRepository};
pub use protocol::{AuthResult, Capabilities, InvokeCommand, ProtocolError};
pub use registry::{ExtensionRegistry, ExtensionRole};
pub use traits::{Authenticator, Authorizer, Mapper, RawExtension, RawExtensionAdapter};
