//! # warden-core
//!
//! Foundation shared by every Warden crate: configuration schemas, typed
//! identifiers, the zeroizing [`Secret`](types::secret::Secret) wrapper and
//! [`AppError`].

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
