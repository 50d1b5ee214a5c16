//! `MAP_USER` and `MAP_AUTH_RECORD` requests and their response.
//!
//! A mapper answers with the rewritten value in the field it was given. A
//! response without that field leaves the input unchanged.

use warden_entity::{AuthRecord, ExtMap};

use super::{
    InvokeCommand, ProtocolError, expect_command, keys, optional_map, optional_str, required_str,
};

/// Translate a user name before authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapUserRequest {
    /// Raw user name.
    pub user: String,
}

impl MapUserRequest {
    /// Encodes to the wire map.
    pub fn into_ext_map(self) -> ExtMap {
        ExtMap::new()
            .with(keys::COMMAND, InvokeCommand::MapUser.as_str())
            .with(keys::USER, self.user)
    }

    /// Decodes from the wire map.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        expect_command(map, InvokeCommand::MapUser)?;
        Ok(Self {
            user: required_str(map, keys::USER)?,
        })
    }
}

/// Rewrite an auth record after authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAuthRecordRequest {
    /// Record to rewrite.
    pub auth_record: AuthRecord,
}

impl MapAuthRecordRequest {
    /// Encodes to the wire map.
    pub fn into_ext_map(self) -> ExtMap {
        ExtMap::new()
            .with(keys::COMMAND, InvokeCommand::MapAuthRecord.as_str())
            .with(keys::AUTH_RECORD, self.auth_record.into_map())
    }

    /// Decodes from the wire map.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        expect_command(map, InvokeCommand::MapAuthRecord)?;
        let record = optional_map(map, keys::AUTH_RECORD)?
            .ok_or(ProtocolError::MissingField(keys::AUTH_RECORD))?;
        Ok(Self {
            auth_record: AuthRecord::from_map(record),
        })
    }
}

/// Mapper output. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingResponse {
    /// Mapped user name.
    pub user: Option<String>,
    /// Mapped auth record.
    pub auth_record: Option<AuthRecord>,
}

impl MappingResponse {
    /// Response carrying a mapped user name.
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            auth_record: None,
        }
    }

    /// Response carrying a mapped auth record.
    pub fn auth_record(record: AuthRecord) -> Self {
        Self {
            user: None,
            auth_record: Some(record),
        }
    }

    /// Encodes to the wire map.
    pub fn into_ext_map(self) -> ExtMap {
        let mut map = ExtMap::new().with(keys::RESULT, super::AuthResult::Success.code());
        if let Some(user) = self.user {
            map.insert(keys::USER, user);
        }
        if let Some(record) = self.auth_record {
            map.insert(keys::AUTH_RECORD, record.into_map());
        }
        map
    }

    /// Decodes from the wire map.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        Ok(Self {
            user: optional_str(map, keys::USER)?,
            auth_record: optional_map(map, keys::AUTH_RECORD)?.map(AuthRecord::from_map),
        })
    }

    /// Mapped user name, falling back to `input`.
    pub fn user_or(self, input: String) -> String {
        self.user.unwrap_or(input)
    }

    /// Mapped record, falling back to `input`.
    pub fn auth_record_or(self, input: AuthRecord) -> AuthRecord {
        self.auth_record.unwrap_or(input)
    }
}
