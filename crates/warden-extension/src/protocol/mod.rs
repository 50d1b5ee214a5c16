//! The extension invocation protocol.
//!
//! On the wire an invocation is a flat [`ExtMap`](warden_entity::ExtMap)
//! carrying a `COMMAND` plus command fields, and the answer is another flat
//! map carrying a `RESULT` plus outputs. Inside the workspace every
//! invocation is typed; [`authn`], [`mapping`] and [`authz`] convert between
//! the two forms and reject malformed maps with a [`ProtocolError`].

pub mod authn;
pub mod authz;
pub mod mapping;

use std::fmt;

use warden_core::AppError;

pub use authn::{AuthnRequest, AuthnResponse};
pub use authz::{FetchPrincipalRequest, FetchPrincipalResponse};
pub use mapping::{MapAuthRecordRequest, MapUserRequest, MappingResponse};

/// Field names of invocation maps.
pub mod keys {
    /// Command selector.
    pub const COMMAND: &str = "COMMAND";
    /// Numeric result code.
    pub const RESULT: &str = "RESULT";
    /// User name.
    pub const USER: &str = "USER";
    /// Credential (password).
    pub const CREDENTIALS: &str = "CREDENTIALS";
    /// Nested auth record.
    pub const AUTH_RECORD: &str = "AUTH_RECORD";
    /// Principal reported by the authenticator.
    pub const PRINCIPAL: &str = "PRINCIPAL";
    /// Where an expired credential can be changed.
    pub const CREDENTIALS_CHANGE_URL: &str = "CREDENTIALS_CHANGE_URL";
    /// Free-form message for the user.
    pub const USER_MESSAGE: &str = "USER_MESSAGE";
    /// Nested principal record.
    pub const PRINCIPAL_RECORD: &str = "PRINCIPAL_RECORD";
}

/// Commands understood by extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeCommand {
    /// Verify a user name and credential.
    AuthenticateCredentials,
    /// Translate a raw user name before authentication.
    MapUser,
    /// Rewrite an auth record after authentication.
    MapAuthRecord,
    /// Look up the principal record for an auth record.
    FetchPrincipalRecord,
}

impl InvokeCommand {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticateCredentials => "AUTHENTICATE_CREDENTIALS",
            Self::MapUser => "MAP_USER",
            Self::MapAuthRecord => "MAP_AUTH_RECORD",
            Self::FetchPrincipalRecord => "FETCH_PRINCIPAL_RECORD",
        }
    }

    /// Parses a wire name.
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        match value {
            "AUTHENTICATE_CREDENTIALS" => Ok(Self::AuthenticateCredentials),
            "MAP_USER" => Ok(Self::MapUser),
            "MAP_AUTH_RECORD" => Ok(Self::MapAuthRecord),
            "FETCH_PRINCIPAL_RECORD" => Ok(Self::FetchPrincipalRecord),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    /// Reads and parses the `COMMAND` field of a request map.
    pub fn from_map(map: &warden_entity::ExtMap) -> Result<Self, ProtocolError> {
        match map.get(keys::COMMAND) {
            None => Err(ProtocolError::MissingField(keys::COMMAND)),
            Some(value) => value
                .as_str()
                .ok_or(ProtocolError::InvalidField {
                    field: keys::COMMAND,
                    expected: "string",
                })
                .and_then(Self::parse),
        }
    }
}

impl fmt::Display for InvokeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result codes returned by authenticators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthResult {
    /// Authenticated.
    Success,
    /// Unspecified failure.
    GeneralError,
    /// Unknown user.
    CredentialsInvalid,
    /// Wrong credential.
    CredentialsIncorrect,
    /// Account locked.
    AccountLocked,
    /// Account disabled.
    AccountDisabled,
    /// Account expired.
    AccountExpired,
    /// The authenticator timed out.
    TimedOut,
    /// Credential accepted but expired.
    CredentialsExpired,
    /// Backing service unreachable.
    RemoteUnavailable,
    /// Any code this protocol version does not define.
    Unknown(i64),
}

impl AuthResult {
    /// Decodes a wire code.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::GeneralError,
            2 => Self::CredentialsInvalid,
            3 => Self::CredentialsIncorrect,
            4 => Self::AccountLocked,
            5 => Self::AccountDisabled,
            6 => Self::AccountExpired,
            7 => Self::TimedOut,
            8 => Self::CredentialsExpired,
            9 => Self::RemoteUnavailable,
            other => Self::Unknown(other),
        }
    }

    /// Wire code.
    pub fn code(&self) -> i64 {
        match self {
            Self::Success => 0,
            Self::GeneralError => 1,
            Self::CredentialsInvalid => 2,
            Self::CredentialsIncorrect => 3,
            Self::AccountLocked => 4,
            Self::AccountDisabled => 5,
            Self::AccountExpired => 6,
            Self::TimedOut => 7,
            Self::CredentialsExpired => 8,
            Self::RemoteUnavailable => 9,
            Self::Unknown(code) => *code,
        }
    }

    /// Whether this is [`AuthResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::GeneralError => write!(f, "GENERAL_ERROR"),
            Self::CredentialsInvalid => write!(f, "CREDENTIALS_INVALID"),
            Self::CredentialsIncorrect => write!(f, "CREDENTIALS_INCORRECT"),
            Self::AccountLocked => write!(f, "ACCOUNT_LOCKED"),
            Self::AccountDisabled => write!(f, "ACCOUNT_DISABLED"),
            Self::AccountExpired => write!(f, "ACCOUNT_EXPIRED"),
            Self::TimedOut => write!(f, "TIMED_OUT"),
            Self::CredentialsExpired => write!(f, "CREDENTIALS_EXPIRED"),
            Self::RemoteUnavailable => write!(f, "REMOTE_UNAVAILABLE"),
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// Capability bits an authenticator advertises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u64);

impl Capabilities {
    /// Accepts `AUTHENTICATE_CREDENTIALS`.
    pub const AUTHENTICATE_CREDENTIALS: Self = Self(1);
    /// Interactive negotiation.
    pub const AUTHENTICATE_NEGOTIATE_INTERACTIVE: Self = Self(2);
    /// Non-interactive negotiation.
    pub const AUTHENTICATE_NEGOTIATE_NON_INTERACTIVE: Self = Self(4);
    /// Password credentials.
    pub const AUTHENTICATE_PASSWORD: Self = Self(8);
    /// Credential change.
    pub const CREDENTIALS_CHANGE: Self = Self(16);
    /// Logout notification.
    pub const LOGOUT: Self = Self(32);

    /// No capabilities.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// From raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Union.
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether password credentials are accepted.
    pub fn supports_password(&self) -> bool {
        self.contains(Self::AUTHENTICATE_PASSWORD)
    }

    /// Whether `AUTHENTICATE_CREDENTIALS` is accepted.
    pub fn supports_credentials(&self) -> bool {
        self.contains(Self::AUTHENTICATE_CREDENTIALS)
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

/// A malformed invocation or response map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// `COMMAND` names nothing this protocol defines.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// The command is valid but not the one this conversion handles.
    #[error("unexpected command {actual}, expected {expected}")]
    UnexpectedCommand {
        /// Command the conversion handles.
        expected: InvokeCommand,
        /// Command found in the map.
        actual: InvokeCommand,
    },
    /// A required field is absent.
    #[error("missing field {0}")]
    MissingField(&'static str),
    /// A field has the wrong JSON type.
    #[error("field {field} must be a {expected}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        AppError::protocol(err.to_string())
    }
}

/// Expects `command` in `map`.
pub(crate) fn expect_command(
    map: &warden_entity::ExtMap,
    expected: InvokeCommand,
) -> Result<(), ProtocolError> {
    let actual = InvokeCommand::from_map(map)?;
    if actual != expected {
        return Err(ProtocolError::UnexpectedCommand { expected, actual });
    }
    Ok(())
}

/// Required string field.
pub(crate) fn required_str(
    map: &warden_entity::ExtMap,
    field: &'static str,
) -> Result<String, ProtocolError> {
    optional_str(map, field)?.ok_or(ProtocolError::MissingField(field))
}

/// Optional string field; JSON null counts as absent.
pub(crate) fn optional_str(
    map: &warden_entity::ExtMap,
    field: &'static str,
) -> Result<Option<String>, ProtocolError> {
    match map.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ProtocolError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

/// Optional nested map field; JSON null counts as absent.
pub(crate) fn optional_map(
    map: &warden_entity::ExtMap,
    field: &'static str,
) -> Result<Option<warden_entity::ExtMap>, ProtocolError> {
    match map.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(_)) => Ok(map.get_map(field)),
        Some(_) => Err(ProtocolError::InvalidField {
            field,
            expected: "map",
        }),
    }
}

/// Optional `RESULT` field.
pub(crate) fn optional_result(
    map: &warden_entity::ExtMap,
) -> Result<Option<AuthResult>, ProtocolError> {
    match map.get(keys::RESULT) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(|code| Some(AuthResult::from_code(code)))
            .ok_or(ProtocolError::InvalidField {
                field: keys::RESULT,
                expected: "integer",
            }),
    }
}
