//! # warden-session
//!
//! Session issuance support for Warden:
//!
//! - High-entropy session token generation
//! - The [`SessionStore`] contract and a concurrent in-memory store
//! - Periodic eviction of expired and idle sessions

pub mod cleanup;
pub mod store;
pub mod token;

pub use cleanup::SessionCleanup;
pub use store::{InMemorySessionStore, SessionStore};
pub use token::{OsTokenGenerator, SESSION_TOKEN_BYTES, TokenGenerator, generate_session_token};
