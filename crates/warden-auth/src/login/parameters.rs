//! Login request parameters.

use warden_core::types::SecretString;
use warden_entity::AuthRecord;

/// How the caller obtained the credentials of the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// User name and password.
    #[default]
    Credentials,
    /// An auth record produced by a negotiation mechanism.
    Negotiation,
}

/// Input of one login attempt.
#[derive(Debug, Clone, Default)]
pub struct LoginParameters {
    /// Submitted user name.
    pub login_name: Option<String>,
    /// Submitted password.
    pub password: Option<SecretString>,
    /// Requested profile.
    pub profile_name: Option<String>,
    /// Auth record obtained out of band. Skips authentication when present.
    pub auth_record: Option<AuthRecord>,
    /// Explicit auth type; selects the success report reason.
    pub auth_type: Option<AuthType>,
    /// Existing session whose remembered credentials may be reused.
    pub session_id: Option<String>,
    /// Session the transport is constructing for this request.
    pub pending_session_id: Option<String>,
}

impl LoginParameters {
    /// Parameters for a user name and password login.
    pub fn credentials(
        profile_name: impl Into<String>,
        login_name: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        Self {
            login_name: Some(login_name.into()),
            password: Some(password.into()),
            profile_name: Some(profile_name.into()),
            auth_type: Some(AuthType::Credentials),
            ..Self::default()
        }
    }

    /// Parameters for a login with an already obtained auth record.
    pub fn with_auth_record(
        profile_name: impl Into<String>,
        auth_record: AuthRecord,
        auth_type: AuthType,
    ) -> Self {
        Self {
            profile_name: Some(profile_name.into()),
            auth_record: Some(auth_record),
            auth_type: Some(auth_type),
            ..Self::default()
        }
    }

    /// Sets the explicit session id.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Sets the session under construction.
    pub fn pending_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.pending_session_id = Some(session_id.into());
        self
    }

    /// Session consulted for remembered credentials.
    pub(crate) fn credential_session(&self) -> Option<&str> {
        non_empty(self.session_id.as_deref()).or(non_empty(self.pending_session_id.as_deref()))
    }

    /// `<login-or-principal>@<profile-or-N/A>`.
    pub(crate) fn display_name(&self) -> String {
        let user = non_empty(self.login_name.as_deref())
            .or_else(|| {
                self.auth_record
                    .as_ref()
                    .and_then(|record| record.principal())
            })
            .unwrap_or_default();
        display_name(user, self.profile_name.as_deref())
    }
}

pub(crate) fn display_name(user: &str, profile_name: Option<&str>) -> String {
    format!("{user}@{}", profile_name.unwrap_or("N/A"))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
