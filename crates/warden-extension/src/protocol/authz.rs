//! `FETCH_PRINCIPAL_RECORD` request and response.

use warden_entity::{AuthRecord, ExtMap, PrincipalRecord};

use super::{InvokeCommand, ProtocolError, expect_command, keys, optional_map};

/// Look up the principal behind an auth record.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPrincipalRequest {
    /// Authenticated identity.
    pub auth_record: AuthRecord,
}

impl FetchPrincipalRequest {
    /// Encodes to the wire map.
    pub fn into_ext_map(self) -> ExtMap {
        ExtMap::new()
            .with(keys::COMMAND, InvokeCommand::FetchPrincipalRecord.as_str())
            .with(keys::AUTH_RECORD, self.auth_record.into_map())
    }

    /// Decodes from the wire map.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        expect_command(map, InvokeCommand::FetchPrincipalRecord)?;
        let record = optional_map(map, keys::AUTH_RECORD)?
            .ok_or(ProtocolError::MissingField(keys::AUTH_RECORD))?;
        Ok(Self {
            auth_record: AuthRecord::from_map(record),
        })
    }
}

/// Authorizer answer; an absent record means the principal is unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchPrincipalResponse {
    /// The principal, when found.
    pub principal_record: Option<PrincipalRecord>,
}

impl FetchPrincipalResponse {
    /// Encodes to the wire map.
    pub fn into_ext_map(self) -> ExtMap {
        let mut map = ExtMap::new().with(keys::RESULT, super::AuthResult::Success.code());
        if let Some(record) = self.principal_record {
            map.insert(keys::PRINCIPAL_RECORD, record.into_map());
        }
        map
    }

    /// Decodes from the wire map.
    pub fn try_from_ext_map(map: &ExtMap) -> Result<Self, ProtocolError> {
        Ok(Self {
            principal_record: optional_map(map, keys::PRINCIPAL_RECORD)?
                .map(PrincipalRecord::from_map),
        })
    }
}
