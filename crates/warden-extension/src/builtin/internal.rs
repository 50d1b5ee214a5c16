//! Configuration-backed directory.
//!
//! Users and groups are declared in `[[extensions.internal]]`. One
//! [`InternalDirectory`] acts as both the authenticator (`{name}-authn`) and
//! the authorizer (`{name}-authz`) of its users.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::{debug, info};
use warden_core::config::{InternalDirectoryConfig, InternalGroupConfig, InternalUserConfig};
use warden_core::{AppError, AppResult};
use warden_entity::record::{auth, principal};
use warden_entity::{AuthRecord, ExtMap, PrincipalRecord};

use super::hasher::PasswordHasher;
use crate::protocol::{
    AuthResult, AuthnRequest, AuthnResponse, Capabilities, FetchPrincipalRequest,
    FetchPrincipalResponse,
};
use crate::traits::{Authenticator, Authorizer};

/// A directory of users and groups held in memory.
#[derive(Debug)]
pub struct InternalDirectory {
    name: String,
    authn_name: String,
    authz_name: String,
    record_ttl: Option<Duration>,
    users: HashMap<String, InternalUserConfig>,
    groups: HashMap<String, InternalGroupConfig>,
    hasher: PasswordHasher,
    /// Verified against for unknown users so every attempt costs one hash check.
    dummy_hash: String,
    verifications: AtomicU64,
}

impl InternalDirectory {
    /// Builds a directory from configuration.
    pub fn from_config(config: &InternalDirectoryConfig) -> AppResult<Self> {
        let mut users = HashMap::new();
        for user in &config.users {
            if users.insert(user.name.clone(), user.clone()).is_some() {
                return Err(AppError::configuration(format!(
                    "Duplicate user '{}' in internal directory '{}'",
                    user.name, config.name
                )));
            }
        }

        let groups = config
            .groups
            .iter()
            .map(|group| (group.name.clone(), group.clone()))
            .collect();

        let hasher = PasswordHasher::new();
        let dummy_hash = hasher.hash_password(&config.authn_name())?;

        info!(directory = %config.name, users = users.len(), "Loaded internal directory");

        Ok(Self {
            name: config.name.clone(),
            authn_name: config.authn_name(),
            authz_name: config.authz_name(),
            record_ttl: config
                .record_ttl_minutes
                .filter(|minutes| *minutes > 0)
                .map(|minutes| Duration::minutes(i64::from(minutes))),
            users,
            groups,
            hasher,
            dummy_hash,
            verifications: AtomicU64::new(0),
        })
    }

    /// Runs the hash check on the blocking pool.
    async fn verify(&self, password: String, hash: String) -> AppResult<bool> {
        self.verifications.fetch_add(1, Ordering::Relaxed);
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }

    fn issue_record(&self, user: &InternalUserConfig) -> AuthRecord {
        let record = AuthRecord::new(&user.name).with(auth::keys::USER, user.name.as_str());
        match self.record_ttl {
            Some(ttl) => record.with_valid_to(Utc::now() + ttl),
            None => record,
        }
    }

    fn principal_record(&self, user: &InternalUserConfig) -> PrincipalRecord {
        let groups: Vec<Value> = user
            .groups
            .iter()
            .map(|group| self.group_record(group, &mut Vec::new()))
            .collect();

        let mut record = PrincipalRecord::default()
            .with(principal::keys::ID, user.name.as_str())
            .with(principal::keys::NAME, user.name.as_str())
            .with(principal::keys::PRINCIPAL, user.name.as_str())
            .with(principal::keys::NAMESPACE, self.name.as_str())
            .with(principal::keys::GROUPS, groups);
        for (key, value) in [
            (principal::keys::FIRST_NAME, &user.first_name),
            (principal::keys::LAST_NAME, &user.last_name),
            (principal::keys::EMAIL, &user.email),
        ] {
            if let Some(value) = value {
                record = record.with(key, value.as_str());
            }
        }
        record
    }

    /// Group record with its parents nested under `GROUPS`. `path` holds the
    /// groups being expanded; a parent already on it is not expanded again.
    fn group_record(&self, name: &str, path: &mut Vec<String>) -> Value {
        path.push(name.to_string());
        let mut parents = Vec::new();
        if let Some(group) = self.groups.get(name) {
            for parent in &group.member_of {
                if !path.contains(parent) {
                    parents.push(self.group_record(parent, path));
                }
            }
        }
        path.pop();

        ExtMap::new()
            .with(principal::keys::ID, name)
            .with(principal::keys::NAME, name)
            .with(principal::keys::GROUPS, parents)
            .into_value()
    }
}

#[async_trait]
impl Authenticator for InternalDirectory {
    fn name(&self) -> &str {
        &self.authn_name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::AUTHENTICATE_CREDENTIALS | Capabilities::AUTHENTICATE_PASSWORD
    }

    async fn authenticate(&self, request: AuthnRequest) -> AppResult<AuthnResponse> {
        let Some(user) = self.users.get(&request.user) else {
            self.verify(request.credentials.expose().clone(), self.dummy_hash.clone()).await?;
            debug!(directory = %self.name, user = %request.user, "Unknown user");
            return Ok(AuthnResponse::failure(AuthResult::CredentialsInvalid));
        };

        let matches = self
            .verify(
                request.credentials.expose().clone(),
                user.password_hash.clone(),
            )
            .await?;

        let response = if !matches {
            AuthnResponse::failure(AuthResult::CredentialsIncorrect)
        } else if user.disabled {
            AuthnResponse::failure(AuthResult::AccountDisabled)
        } else if user.locked {
            AuthnResponse::failure(AuthResult::AccountLocked)
        } else if user.password_expired {
            let response = AuthnResponse::failure(AuthResult::CredentialsExpired);
            match &user.change_url {
                Some(url) => response.with_change_url(url),
                None => response,
            }
        } else {
            return Ok(AuthnResponse::success(self.issue_record(user)));
        };

        Ok(response.with_principal(&user.name))
    }
}

#[async_trait]
impl Authorizer for InternalDirectory {
    fn name(&self) -> &str {
        &self.authz_name
    }

    async fn fetch_principal(
        &self,
        request: FetchPrincipalRequest,
    ) -> AppResult<FetchPrincipalResponse> {
        let principal_record = request
            .auth_record
            .principal()
            .and_then(|principal| self.users.get(principal))
            .map(|user| self.principal_record(user));
        Ok(FetchPrincipalResponse { principal_record })
    }
}
