//! Error type shared by every Warden crate.
//!
//! Rejected logins are outcomes, not errors. An [`AppError`] reaching the
//! login boundary means a collaborator malfunctioned, or the secure random
//! source failed ([`ErrorKind::RandomSource`]), which is the one fatal case.

use std::fmt;
use thiserror::Error;

/// What went wrong, independent of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A stored entity does not exist.
    NotFound,
    /// A name is already taken.
    Conflict,
    /// Unexpected internal failure.
    Internal,
    /// The user directory database failed.
    Database,
    /// Invalid or incomplete configuration.
    Configuration,
    /// An extension reported a failure.
    Extension,
    /// An extension answered with a malformed map.
    Protocol,
    /// No secure randomness available.
    RandomSource,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Extension => "EXTENSION",
            Self::Protocol => "PROTOCOL",
            Self::RandomSource => "RANDOM_SOURCE",
        };
        f.write_str(name)
    }
}

/// Workspace-wide error.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps `source` as the cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn extension(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Extension, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    pub fn random_source(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RandomSource, message)
    }

    /// Fatal errors abort the login instead of failing it.
    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::RandomSource
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
