//! `AUTHENTICATE_CREDENTIALS` request and response.

use warden_core::types::SecretString;
use warden_entity::{AuthRecord, ExtMap};

use super::{
    AuthResult, InvokeCommand, ProtocolError, expect_command, keys, optional_map, optional_result,
    optional_str, required_str,
};

/// Credentials submitted for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthnRequest {
    /// User name, possibly already mapped.
    pub user: String,
    /// The password.
    pub credentials: SecretString,
}

impl AuthnRequest {
    /// Creates a request.
    pub fn new(user: impl Into<String>, credentials: SecretString) -> Self {
        Self {
            user: user.into(),
            credentials,
        }
    }

    /// Encodes to the wire map. The credential leaves its [`SecretString`]
    /// wrapper here.
    pub fn into_ext_map(self) -> ExtMap {
        ExtMap::new()
            .with(keys::COMMAND, InvokeCommand::AuthenticateCredentials.as_str())
            .with(keys::USER, self.user)
            .with(keys::CREDENTIALS, self.credentials.expose().as_str())
    }

    /// Decodes from the wire map.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        expect_command(map, InvokeCommand::AuthenticateCredentials)?;
        Ok(Self {
            user: required_str(map, keys::USER)?,
            credentials: SecretString::from(required_str(map, keys::CREDENTIALS)?),
        })
    }
}

/// Authenticator verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthnResponse {
    /// Result code.
    pub result: AuthResult,
    /// Principal the authenticator resolved, also reported on failure.
    pub principal: Option<String>,
    /// Present exactly when `result` is success.
    pub auth_record: Option<AuthRecord>,
    /// Where an expired credential can be changed.
    pub credentials_change_url: Option<String>,
    /// Message from the authenticator to the user.
    pub user_message: Option<String>,
}

impl AuthnResponse {
    /// A successful response carrying `record`.
    pub fn success(record: AuthRecord) -> Self {
        Self {
            result: AuthResult::Success,
            principal: record.principal().map(str::to_string),
            auth_record: Some(record),
            credentials_change_url: None,
            user_message: None,
        }
    }

    /// A failed response.
    pub fn failure(result: AuthResult) -> Self {
        Self {
            result,
            principal: None,
            auth_record: None,
            credentials_change_url: None,
            user_message: None,
        }
    }

    /// Sets the reported principal.
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Sets the credential change URL.
    pub fn with_change_url(mut self, url: impl Into<String>) -> Self {
        self.credentials_change_url = Some(url.into());
        self
    }

    /// Sets the user message.
    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    /// Encodes to the wire map.
    pub fn into_ext_map(self) -> ExtMap {
        let mut map = ExtMap::new().with(keys::RESULT, self.result.code());
        if let Some(principal) = self.principal {
            map.insert(keys::PRINCIPAL, principal);
        }
        if let Some(record) = self.auth_record {
            map.insert(keys::AUTH_RECORD, record.into_map());
        }
        if let Some(url) = self.credentials_change_url {
            map.insert(keys::CREDENTIALS_CHANGE_URL, url);
        }
        if let Some(message) = self.user_message {
            map.insert(keys::USER_MESSAGE, message);
        }
        map
    }

    /// Decodes from the wire map. `RESULT` is mandatory and a successful
    /// result must carry `AUTH_RECORD`.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        let result = optional_result(map)?.ok_or(ProtocolError::MissingField(keys::RESULT))?;
        let auth_record = optional_map(map, keys::AUTH_RECORD)?.map(AuthRecord::from_map);

        if result.is_success() && auth_record.is_none() {
            return Err(ProtocolError::MissingField(keys::AUTH_RECORD));
        }

        Ok(Self {
            result,
            principal: optional_str(map, keys::PRINCIPAL)?,
            auth_record,
            credentials_change_url: optional_str(map, keys::CREDENTIALS_CHANGE_URL)?,
            user_message: optional_str(map, keys::USER_MESSAGE)?,
        })
    }
}
