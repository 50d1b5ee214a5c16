//! User-facing login messages and the result-code tables.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;
use warden_entity::AuditLogType;
use warden_extension::AuthResult;

/// Message variable carrying a credential change URL.
pub const VAR_URL: &str = "URL";
/// Message variable carrying an authenticator message.
pub const VAR_MSG: &str = "MSG";

/// Messages a failed login can surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginMessage {
    FailedToAuthenticate,
    WrongUsernameOrPassword,
    AccountDisabled,
    AccountExpired,
    AuthTimedOut,
    PasswordExpired,
    PasswordExpiredWithUrl,
    PasswordExpiredWithMessage,
    UserMustExistInDirectory,
    NotAuthorizedToPerformAction,
}

impl LoginMessage {
    /// Stable message key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedToAuthenticate => "USER_FAILED_TO_AUTHENTICATE",
            Self::WrongUsernameOrPassword => "USER_FAILED_TO_AUTHENTICATE_WRONG_USERNAME_OR_PASSWORD",
            Self::AccountDisabled => "USER_FAILED_TO_AUTHENTICATE_ACCOUNT_IS_LOCKED_OR_DISABLED",
            Self::AccountExpired => "USER_FAILED_TO_AUTHENTICATE_ACCOUNT_EXPIRED",
            Self::AuthTimedOut => "USER_FAILED_TO_AUTHENTICATE_TIMED_OUT",
            Self::PasswordExpired => "USER_PASSWORD_EXPIRED",
            Self::PasswordExpiredWithUrl => "USER_PASSWORD_EXPIRED_CHANGE_URL_PROVIDED",
            Self::PasswordExpiredWithMessage => "USER_PASSWORD_EXPIRED_CHANGE_MSG_PROVIDED",
            Self::UserMustExistInDirectory => "USER_MUST_EXIST_IN_DIRECTORY",
            Self::NotAuthorizedToPerformAction => "USER_NOT_AUTHORIZED_TO_PERFORM_ACTION",
        }
    }
}

impl fmt::Display for LoginMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message with its substitution variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    /// Message key.
    pub message: LoginMessage,
    /// Variables referenced by the message text.
    pub variables: BTreeMap<String, String>,
}

impl UserMessage {
    /// A message without variables.
    pub fn new(message: LoginMessage) -> Self {
        Self {
            message,
            variables: BTreeMap::new(),
        }
    }

    /// Adds a variable.
    pub fn with_variable(mut self, name: &str, value: impl Into<String>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    /// Value of a variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

impl From<LoginMessage> for UserMessage {
    fn from(message: LoginMessage) -> Self {
        Self::new(message)
    }
}

/// Per-cause audit event of a failed authentication.
static AUDIT_LOG_TYPES: LazyLock<HashMap<AuthResult, AuditLogType>> = LazyLock::new(|| {
    HashMap::from([
        (AuthResult::CredentialsExpired, AuditLogType::UserAccountPasswordExpired),
        (AuthResult::GeneralError, AuditLogType::UserLoginFailed),
        (AuthResult::CredentialsInvalid, AuditLogType::AuthFailedInvalidCredentials),
        (AuthResult::CredentialsIncorrect, AuditLogType::AuthFailedInvalidCredentials),
        (AuthResult::AccountLocked, AuditLogType::UserAccountDisabledOrLocked),
        (AuthResult::AccountDisabled, AuditLogType::UserAccountDisabledOrLocked),
        (AuthResult::TimedOut, AuditLogType::UserAccountDisabledOrLocked),
        (AuthResult::AccountExpired, AuditLogType::UserAccountExpired),
    ])
});

/// User-facing message of a failed authentication.
static FAILURE_MESSAGES: LazyLock<HashMap<AuthResult, LoginMessage>> = LazyLock::new(|| {
    HashMap::from([
        (AuthResult::CredentialsExpired, LoginMessage::PasswordExpired),
        (AuthResult::GeneralError, LoginMessage::FailedToAuthenticate),
        (AuthResult::CredentialsInvalid, LoginMessage::WrongUsernameOrPassword),
        (AuthResult::CredentialsIncorrect, LoginMessage::WrongUsernameOrPassword),
        (AuthResult::AccountLocked, LoginMessage::AccountDisabled),
        (AuthResult::AccountDisabled, LoginMessage::AccountDisabled),
        (AuthResult::TimedOut, LoginMessage::AuthTimedOut),
        (AuthResult::AccountExpired, LoginMessage::AccountExpired),
    ])
});

/// Audit event for `result`, if the code has one.
pub fn audit_log_type_for(result: AuthResult) -> Option<AuditLogType> {
    AUDIT_LOG_TYPES.get(&result).copied()
}

/// Message for `result`; unmapped codes get [`LoginMessage::FailedToAuthenticate`].
pub fn failure_message_for(result: AuthResult) -> LoginMessage {
    FAILURE_MESSAGES
        .get(&result)
        .copied()
        .unwrap_or(LoginMessage::FailedToAuthenticate)
}
