//! # Warden
//!
//! Login orchestration core. A login request names an authentication
//! profile, which binds an authenticator, an authorizer and an optional
//! mapper. Warden verifies the credentials, resolves the principal,
//! synchronizes it into the local user directory, checks the login
//! permission and issues a session.
//!
//! The workspace crates:
//!
//! - `warden-core`: configuration, errors, identifiers, secrets
//! - `warden-entity`: records, local users, sessions, audit entries
//! - `warden-extension`: extension protocol, role traits, registry, profiles
//! - `warden-session`: session tokens, store and cleanup
//! - `warden-database`: local user directory
//! - `warden-worker`: background bookkeeping
//! - `warden-auth`: the login command

pub mod bootstrap;

pub use bootstrap::{Warden, init_logging};
pub use warden_auth::{LoginCommand, LoginParameters, LoginReturnValue};
pub use warden_core::config::AppConfig;
pub use warden_core::{AppError, AppResult};
