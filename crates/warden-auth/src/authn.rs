//! Credential verification and identity mapping.

use tracing::debug;
use warden_core::AppResult;
use warden_core::types::SecretString;
use warden_entity::AuthRecord;
use warden_extension::AuthenticationProfile;
use warden_extension::protocol::{
    AuthResult, AuthnRequest, AuthnResponse, MapAuthRecordRequest, MapUserRequest,
};

use crate::login::messages::{self, LoginMessage, UserMessage, VAR_MSG, VAR_URL};
use crate::login::outcome::{AuthFailureReason, LoginFailure};

/// What the authenticator said, and to whom.
#[derive(Debug, Clone)]
pub struct Authentication {
    /// User name sent to the authenticator, after `MAP_USER`.
    pub mapped_user: String,
    /// Authenticator verdict.
    pub response: AuthnResponse,
}

/// Translates the submitted user name through the profile's mapper, if any.
pub async fn map_user(profile: &AuthenticationProfile, user: String) -> AppResult<String> {
    let Some(mapper) = &profile.mapper else {
        return Ok(user);
    };
    let response = mapper
        .map_user(MapUserRequest { user: user.clone() })
        .await?;
    Ok(response.user_or(user))
}

/// Lets the profile's mapper rewrite the auth record, if any.
pub async fn map_auth_record(
    profile: &AuthenticationProfile,
    auth_record: AuthRecord,
) -> AppResult<AuthRecord> {
    let Some(mapper) = &profile.mapper else {
        return Ok(auth_record);
    };
    let response = mapper
        .map_auth_record(MapAuthRecordRequest {
            auth_record: auth_record.clone(),
        })
        .await?;
    Ok(response.auth_record_or(auth_record))
}

/// Invokes `AUTHENTICATE_CREDENTIALS`, mapping the user name first when the
/// authenticator accepts credentials.
pub async fn authenticate(
    profile: &AuthenticationProfile,
    user: String,
    password: SecretString,
) -> AppResult<Authentication> {
    let mapped_user = if profile.authn.capabilities().supports_credentials() {
        map_user(profile, user).await?
    } else {
        user
    };

    debug!(profile = %profile.name, user = %mapped_user, "Authenticating credentials");
    let response = profile
        .authn
        .authenticate(AuthnRequest::new(mapped_user.clone(), password))
        .await?;

    Ok(Authentication {
        mapped_user,
        response,
    })
}

/// Failure kind and user messages for a non-success response.
pub fn interpret_failure(response: &AuthnResponse) -> (LoginFailure, Vec<UserMessage>) {
    match response.result {
        AuthResult::CredentialsExpired => {
            let change_url = trimmed(response.credentials_change_url.as_deref());
            let user_message = trimmed(response.user_message.as_deref());

            let mut messages = Vec::new();
            if let Some(url) = &change_url {
                messages.push(
                    UserMessage::new(LoginMessage::PasswordExpiredWithUrl)
                        .with_variable(VAR_URL, url.as_str()),
                );
            }
            if let Some(msg) = &user_message {
                messages.push(
                    UserMessage::new(LoginMessage::PasswordExpiredWithMessage)
                        .with_variable(VAR_MSG, msg.as_str()),
                );
            }
            if messages.is_empty() {
                messages.push(UserMessage::new(LoginMessage::PasswordExpired));
            }

            (
                LoginFailure::CredentialsExpired {
                    change_url,
                    user_message,
                },
                messages,
            )
        }
        result => (
            LoginFailure::AuthenticationFailed {
                reason: AuthFailureReason::from(result),
            },
            vec![UserMessage::new(messages::failure_message_for(result))],
        ),
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
