//! Extensions shipped with Warden and their registration from configuration.

pub mod hasher;
pub mod internal;
pub mod mapping;

use std::sync::Arc;

use warden_core::AppResult;
use warden_core::config::ExtensionsConfig;

pub use hasher::PasswordHasher;
pub use internal::InternalDirectory;
pub use mapping::SuffixMapper;

use crate::registry::ExtensionRegistry;

/// Registers every configured built-in extension.
pub async fn register_builtins(
    config: &ExtensionsConfig,
    registry: &ExtensionRegistry,
) -> AppResult<()> {
    for directory in &config.internal {
        let directory = Arc::new(InternalDirectory::from_config(directory)?);
        registry.register_authenticator(directory.clone()).await?;
        registry.register_authorizer(directory).await?;
    }

    for mapper in &config.mappers {
        registry
            .register_mapper(Arc::new(SuffixMapper::from_config(mapper)))
            .await?;
    }

    Ok(())
}
