//! Extension registry: named authenticator, mapper and authorizer instances.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use warden_core::{AppError, AppResult};

use crate::traits::{Authenticator, Authorizer, Mapper, RawExtension, RawExtensionAdapter};

/// Role a registered extension plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionRole {
    /// Credential verification.
    Authenticator,
    /// Identity translation.
    Mapper,
    /// Principal lookup.
    Authorizer,
}

/// Registry of all extensions available to profiles.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    /// Name → authenticator.
    authenticators: RwLock<HashMap<String, Arc<dyn Authenticator>>>,
    /// Name → mapper.
    mappers: RwLock<HashMap<String, Arc<dyn Mapper>>>,
    /// Name → authorizer.
    authorizers: RwLock<HashMap<String, Arc<dyn Authorizer>>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an authenticator under its own name.
    pub async fn register_authenticator(&self, ext: Arc<dyn Authenticator>) -> AppResult<()> {
        let name = ext.name().to_string();
        let mut authenticators = self.authenticators.write().await;
        if authenticators.contains_key(&name) {
            return Err(already_registered(ExtensionRole::Authenticator, &name));
        }
        info!(
            extension = %name,
            capabilities = ext.capabilities().bits(),
            "Registering authenticator"
        );
        authenticators.insert(name, ext);
        Ok(())
    }

    /// Registers a mapper under its own name.
    pub async fn register_mapper(&self, ext: Arc<dyn Mapper>) -> AppResult<()> {
        let name = ext.name().to_string();
        let mut mappers = self.mappers.write().await;
        if mappers.contains_key(&name) {
            return Err(already_registered(ExtensionRole::Mapper, &name));
        }
        info!(extension = %name, "Registering mapper");
        mappers.insert(name, ext);
        Ok(())
    }

    /// Registers an authorizer under its own name.
    pub async fn register_authorizer(&self, ext: Arc<dyn Authorizer>) -> AppResult<()> {
        let name = ext.name().to_string();
        let mut authorizers = self.authorizers.write().await;
        if authorizers.contains_key(&name) {
            return Err(already_registered(ExtensionRole::Authorizer, &name));
        }
        info!(extension = %name, "Registering authorizer");
        authorizers.insert(name, ext);
        Ok(())
    }

    /// Registers a raw-map extension for each of `roles`.
    pub async fn register_raw(
        &self,
        ext: Arc<dyn RawExtension>,
        roles: &[ExtensionRole],
    ) -> AppResult<()> {
        for role in roles {
            match role {
                ExtensionRole::Authenticator => {
                    self.register_authenticator(RawExtensionAdapter::authenticator(ext.clone()))
                        .await?
                }
                ExtensionRole::Mapper => {
                    self.register_mapper(RawExtensionAdapter::mapper(ext.clone()))
                        .await?
                }
                ExtensionRole::Authorizer => {
                    self.register_authorizer(RawExtensionAdapter::authorizer(ext.clone()))
                        .await?
                }
            }
        }
        Ok(())
    }

    /// Looks up an authenticator.
    pub async fn authenticator(&self, name: &str) -> Option<Arc<dyn Authenticator>> {
        self.authenticators.read().await.get(name).cloned()
    }

    /// Looks up a mapper.
    pub async fn mapper(&self, name: &str) -> Option<Arc<dyn Mapper>> {
        self.mappers.read().await.get(name).cloned()
    }

    /// Looks up an authorizer.
    pub async fn authorizer(&self, name: &str) -> Option<Arc<dyn Authorizer>> {
        self.authorizers.read().await.get(name).cloned()
    }

    /// Total number of registrations across roles.
    pub async fn count(&self) -> usize {
        self.authenticators.read().await.len()
            + self.mappers.read().await.len()
            + self.authorizers.read().await.len()
    }
}

fn already_registered(role: ExtensionRole, name: &str) -> AppError {
    AppError::conflict(format!("{role:?} '{name}' is already registered"))
}
