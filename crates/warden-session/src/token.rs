//! Session token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use warden_core::{AppError, AppResult};

/// Random bytes per session token.
pub const SESSION_TOKEN_BYTES: usize = 64;

/// Produces session tokens. An error means no secure randomness is
/// available and is fatal to the caller.
pub trait TokenGenerator: Send + Sync + std::fmt::Debug {
    /// Generates a fresh token.
    fn generate(&self) -> AppResult<String>;
}

/// Tokens from the operating system's secure random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self) -> AppResult<String> {
        generate_session_token()
    }
}

/// Generates [`SESSION_TOKEN_BYTES`] random bytes encoded as URL-safe base64
/// without padding.
pub fn generate_session_token() -> AppResult<String> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| {
        AppError::random_source(format!("Secure random source unavailable: {e}"))
    })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
