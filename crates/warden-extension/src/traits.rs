//! Extension role traits and the raw map adapter.
//!
//! The login flow talks to extensions through one trait per role. Extensions
//! that only speak the flat-map protocol implement [`RawExtension`] and are
//! wrapped in a [`RawExtensionAdapter`], which performs the typed conversion
//! and validation at the boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use warden_core::{AppError, AppResult};
use warden_entity::{AuthRecord, ExtMap, PrincipalRecord};

use crate::protocol::{
    AuthResult, AuthnRequest, AuthnResponse, Capabilities, FetchPrincipalRequest,
    FetchPrincipalResponse, MapAuthRecordRequest, MapUserRequest, MappingResponse,
    optional_result,
};

/// Verifies credentials.
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Registry name.
    fn name(&self) -> &str;

    /// Advertised capabilities.
    fn capabilities(&self) -> Capabilities;

    /// Handles `AUTHENTICATE_CREDENTIALS`.
    async fn authenticate(&self, request: AuthnRequest) -> AppResult<AuthnResponse>;
}

/// Translates identities before and after authentication.
#[async_trait]
pub trait Mapper: Send + Sync + std::fmt::Debug {
    /// Registry name.
    fn name(&self) -> &str;

    /// Handles `MAP_USER`.
    async fn map_user(&self, request: MapUserRequest) -> AppResult<MappingResponse>;

    /// Handles `MAP_AUTH_RECORD`.
    async fn map_auth_record(&self, request: MapAuthRecordRequest) -> AppResult<MappingResponse>;
}

/// Resolves principals.
#[async_trait]
pub trait Authorizer: Send + Sync + std::fmt::Debug {
    /// Registry name. Doubles as the domain of synchronized local users.
    fn name(&self) -> &str;

    /// Handles `FETCH_PRINCIPAL_RECORD`.
    async fn fetch_principal(
        &self,
        request: FetchPrincipalRequest,
    ) -> AppResult<FetchPrincipalResponse>;
}

/// An extension speaking the untyped map protocol.
#[async_trait]
pub trait RawExtension: Send + Sync + std::fmt::Debug {
    /// Registry name.
    fn name(&self) -> &str;

    /// Capability bits; only meaningful for authenticators.
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Handles one invocation.
    async fn invoke(&self, input: ExtMap) -> AppResult<ExtMap>;
}

/// Exposes a [`RawExtension`] through the typed role traits.
#[derive(Debug, Clone)]
pub struct RawExtensionAdapter {
    inner: Arc<dyn RawExtension>,
}

impl RawExtensionAdapter {
    /// Creates an adapter.
    pub fn new(inner: Arc<dyn RawExtension>) -> Self {
        Self { inner }
    }

    /// Wraps a raw extension as an authenticator.
    pub fn authenticator(inner: Arc<dyn RawExtension>) -> Arc<dyn Authenticator> {
        Arc::new(Self::new(inner))
    }

    /// Wraps a raw extension as a mapper.
    pub fn mapper(inner: Arc<dyn RawExtension>) -> Arc<dyn Mapper> {
        Arc::new(Self::new(inner))
    }

    /// Wraps a raw extension as an authorizer.
    pub fn authorizer(inner: Arc<dyn RawExtension>) -> Arc<dyn Authorizer> {
        Arc::new(Self::new(inner))
    }

    async fn call(&self, input: ExtMap) -> AppResult<ExtMap> {
        debug!(
            extension = %self.inner.name(),
            command = ?input.get_str(crate::protocol::keys::COMMAND),
            "Invoking extension"
        );
        self.inner.invoke(input).await
    }

    /// Non-authenticator responses may omit `RESULT`; any other code than
    /// success is an extension failure.
    fn ensure_success(&self, output: &ExtMap) -> AppResult<()> {
        match optional_result(output)? {
            None | Some(AuthResult::Success) => Ok(()),
            Some(other) => Err(AppError::extension(format!(
                "Extension '{}' returned {other}",
                self.inner.name()
            ))),
        }
    }
}

#[async_trait]
impl Authenticator for RawExtensionAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    async fn authenticate(&self, request: AuthnRequest) -> AppResult<AuthnResponse> {
        let output = self.call(request.into_ext_map()).await?;
        Ok(AuthnResponse::try_from_ext_map(&output)?)
    }
}

#[async_trait]
impl Mapper for RawExtensionAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn map_user(&self, request: MapUserRequest) -> AppResult<MappingResponse> {
        let output = self.call(request.into_ext_map()).await?;
        self.ensure_success(&output)?;
        Ok(MappingResponse::try_from_ext_map(&output)?)
    }

    async fn map_auth_record(&self, request: MapAuthRecordRequest) -> AppResult<MappingResponse> {
        let output = self.call(request.into_ext_map()).await?;
        self.ensure_success(&output)?;
        Ok(MappingResponse::try_from_ext_map(&output)?)
    }
}

#[async_trait]
impl Authorizer for RawExtensionAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_principal(
        &self,
        request: FetchPrincipalRequest,
    ) -> AppResult<FetchPrincipalResponse> {
        let output = self.call(request.into_ext_map()).await?;
        self.ensure_success(&output)?;
        Ok(FetchPrincipalResponse::try_from_ext_map(&output)?)
    }
}

/// Convenience over [`Authorizer::fetch_principal`].
pub async fn fetch_principal_record(
    authorizer: &dyn Authorizer,
    auth_record: &AuthRecord,
) -> AppResult<Option<PrincipalRecord>> {
    let response = authorizer
        .fetch_principal(FetchPrincipalRequest {
            auth_record: auth_record.clone(),
        })
        .await?;
    Ok(response.principal_record)
}
