//! Authentication profiles and the read-only profile repository.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use warden_core::config::ProfileConfig;
use warden_core::{AppError, AppResult};

use crate::registry::ExtensionRegistry;
use crate::traits::{Authenticator, Authorizer, Mapper};

/// An authenticator, an authorizer and an optional mapper bound under a name.
#[derive(Debug, Clone)]
pub struct AuthenticationProfile {
    /// Profile name.
    pub name: String,
    /// Credential verifier.
    pub authn: Arc<dyn Authenticator>,
    /// Principal resolver.
    pub authz: Arc<dyn Authorizer>,
    /// Identity translator.
    pub mapper: Option<Arc<dyn Mapper>>,
}

impl AuthenticationProfile {
    /// Creates a profile.
    pub fn new(
        name: impl Into<String>,
        authn: Arc<dyn Authenticator>,
        authz: Arc<dyn Authorizer>,
        mapper: Option<Arc<dyn Mapper>>,
    ) -> Self {
        Self {
            name: name.into(),
            authn,
            authz,
            mapper,
        }
    }

    /// Name of the authorizer, the domain of local users of this profile.
    pub fn authz_name(&self) -> &str {
        self.authz.name()
    }
}

/// Profiles by name. Built once at startup and never modified afterwards.
#[derive(Debug, Default)]
pub struct ProfileRepository {
    profiles: HashMap<String, Arc<AuthenticationProfile>>,
}

impl ProfileRepository {
    /// Builds the repository from already assembled profiles.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = AuthenticationProfile>,
    ) -> AppResult<Self> {
        let mut by_name = HashMap::new();
        for profile in profiles {
            if by_name.contains_key(&profile.name) {
                return Err(AppError::configuration(format!(
                    "Duplicate authentication profile '{}'",
                    profile.name
                )));
            }
            by_name.insert(profile.name.clone(), Arc::new(profile));
        }
        Ok(Self { profiles: by_name })
    }

    /// Resolves configured profiles against the registry.
    pub async fn build(configs: &[ProfileConfig], registry: &ExtensionRegistry) -> AppResult<Self> {
        let mut profiles = Vec::with_capacity(configs.len());

        for config in configs {
            let authn = registry.authenticator(&config.authn).await.ok_or_else(|| {
                missing_extension(&config.name, "authenticator", &config.authn)
            })?;
            let authz = registry
                .authorizer(&config.authz)
                .await
                .ok_or_else(|| missing_extension(&config.name, "authorizer", &config.authz))?;
            let mapper = match &config.mapper {
                Some(name) => Some(
                    registry
                        .mapper(name)
                        .await
                        .ok_or_else(|| missing_extension(&config.name, "mapper", name))?,
                ),
                None => None,
            };

            info!(
                profile = %config.name,
                authn = %config.authn,
                authz = %config.authz,
                mapper = ?config.mapper,
                "Loaded authentication profile"
            );
            profiles.push(AuthenticationProfile::new(&config.name, authn, authz, mapper));
        }

        Self::from_profiles(profiles)
    }

    /// Looks up a profile. An absent name matches nothing.
    pub fn get_profile(&self, name: Option<&str>) -> Option<Arc<AuthenticationProfile>> {
        name.and_then(|name| self.profiles.get(name).cloned())
    }

    /// Sorted profile names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profile is configured.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn missing_extension(profile: &str, role: &str, name: &str) -> AppError {
    AppError::configuration(format!(
        "Profile '{profile}' references unknown {role} '{name}'"
    ))
}
