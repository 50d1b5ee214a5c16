//! Suffix-stripping mapper.

use async_trait::async_trait;
use tracing::debug;
use warden_core::AppResult;
use warden_core::config::MapperConfig;

use crate::protocol::{MapAuthRecordRequest, MapUserRequest, MappingResponse};
use crate::traits::Mapper;

/// Strips a configured suffix from user names (`alice@corp` → `alice`) and
/// optionally lowercases the principal of authenticated records.
#[derive(Debug, Clone)]
pub struct SuffixMapper {
    name: String,
    strip_suffix: Option<String>,
    lowercase: bool,
}

impl SuffixMapper {
    /// Creates a mapper from configuration.
    pub fn from_config(config: &MapperConfig) -> Self {
        Self {
            name: config.name.clone(),
            strip_suffix: config.strip_suffix.clone().filter(|s| !s.is_empty()),
            lowercase: config.lowercase,
        }
    }
}

#[async_trait]
impl Mapper for SuffixMapper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn map_user(&self, request: MapUserRequest) -> AppResult<MappingResponse> {
        let mapped = match &self.strip_suffix {
            Some(suffix) => request
                .user
                .strip_suffix(suffix.as_str())
                .unwrap_or(&request.user)
                .to_string(),
            None => request.user,
        };
        debug!(mapper = %self.name, user = %mapped, "Mapped user");
        Ok(MappingResponse::user(mapped))
    }

    async fn map_auth_record(&self, request: MapAuthRecordRequest) -> AppResult<MappingResponse> {
        if !self.lowercase {
            return Ok(MappingResponse::default());
        }
        let mut record = request.auth_record;
        if let Some(principal) = record.principal().map(str::to_lowercase) {
            record.set_principal(principal);
        }
        Ok(MappingResponse::auth_record(record))
    }
}
