//! # warden-database
//!
//! The local user directory. Principals that log in are synchronized into
//! [`LocalUser`](warden_entity::LocalUser) rows through create-or-update.
//! A PostgreSQL implementation backs production deployments; the in-memory
//! one serves tests and database-less setups.

pub mod connection;
pub mod directory;
pub mod migration;

pub use connection::DatabasePool;
pub use directory::{MemoryUserDirectory, PgUserDirectory, UserDirectory};
