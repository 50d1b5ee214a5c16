//! Login stages, failure kinds and the login result.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use warden_entity::LocalUser;
use warden_extension::AuthResult;

use super::messages::{LoginMessage, UserMessage};

/// Steps of a login attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStage {
    Start,
    ProfileResolved,
    CredentialsSubmitted,
    AuthRecordSupplied,
    Authenticated,
    Mapped,
    PrincipalResolved,
    DirectorySynced,
    Authorized,
    SessionIssued,
}

impl LoginStage {
    /// Stage name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ProfileResolved => "profile_resolved",
            Self::CredentialsSubmitted => "credentials_submitted",
            Self::AuthRecordSupplied => "auth_record_supplied",
            Self::Authenticated => "authenticated",
            Self::Mapped => "mapped",
            Self::PrincipalResolved => "principal_resolved",
            Self::DirectorySynced => "directory_synced",
            Self::Authorized => "authorized",
            Self::SessionIssued => "session_issued",
        }
    }
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an authenticator rejected the credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureReason {
    GeneralError,
    InvalidCredentials,
    AccountLocked,
    AccountDisabled,
    AccountExpired,
    TimedOut,
    /// A code with no dedicated handling.
    Unknown(i64),
}

impl From<AuthResult> for AuthFailureReason {
    fn from(result: AuthResult) -> Self {
        match result {
            AuthResult::GeneralError => Self::GeneralError,
            AuthResult::CredentialsInvalid | AuthResult::CredentialsIncorrect => {
                Self::InvalidCredentials
            }
            AuthResult::AccountLocked => Self::AccountLocked,
            AuthResult::AccountDisabled => Self::AccountDisabled,
            AuthResult::AccountExpired => Self::AccountExpired,
            AuthResult::TimedOut => Self::TimedOut,
            other => Self::Unknown(other.code()),
        }
    }
}

/// Terminal failure of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoginFailure {
    #[error("authentication profile not found")]
    ProfileNotFound,
    #[error("login name missing")]
    MissingLoginName,
    #[error("password missing")]
    MissingPassword,
    #[error("authenticator does not support password authentication")]
    UnsupportedAuthMethod,
    #[error("authentication failed: {reason:?}")]
    AuthenticationFailed { reason: AuthFailureReason },
    #[error("credentials expired")]
    CredentialsExpired {
        change_url: Option<String>,
        user_message: Option<String>,
    },
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("login not permitted")]
    AuthorizationDenied,
    /// A collaborator failed while the attempt was at `stage`.
    #[error("collaborator unavailable at {stage}")]
    Unavailable { stage: LoginStage },
}

/// Result of [`LoginCommand::run`](super::LoginCommand::run).
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginReturnValue {
    /// Whether a session was issued.
    pub succeeded: bool,
    /// Token of the issued session.
    pub session_id: Option<String>,
    /// The authenticated local user.
    pub user: Option<LocalUser>,
    /// Messages for the user, in the order they were raised.
    pub messages: Vec<UserMessage>,
    /// Why the attempt failed.
    pub failure: Option<LoginFailure>,
}

impl LoginReturnValue {
    pub(crate) fn success(session_id: String, user: LocalUser) -> Self {
        Self {
            succeeded: true,
            session_id: Some(session_id),
            user: Some(user),
            messages: Vec::new(),
            failure: None,
        }
    }

    pub(crate) fn failure(failure: LoginFailure, messages: Vec<UserMessage>) -> Self {
        Self {
            succeeded: false,
            session_id: None,
            user: None,
            messages,
            failure: Some(failure),
        }
    }

    /// Whether `message` was raised.
    pub fn has_message(&self, message: LoginMessage) -> bool {
        self.messages.iter().any(|m| m.message == message)
    }

    /// First raised instance of `message`.
    pub fn message(&self, message: LoginMessage) -> Option<&UserMessage> {
        self.messages.iter().find(|m| m.message == message)
    }
}
