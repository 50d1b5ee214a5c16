//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::watch;

use warden_auth::{
    AccountingDispatcher, LoginCommand, LoginDependencies, MemoryAccountingSink, MemoryAuditLog,
    StaticPermissionTable,
};
use warden_core::AppResult;
use warden_core::config::{PermissionConfig, SessionConfig, WorkerConfig};
use warden_database::{MemoryUserDirectory, UserDirectory};
use warden_entity::ExtMap;
use warden_extension::protocol::keys;
use warden_extension::{
    AuthenticationProfile, Capabilities, InvokeCommand, ProfileRepository, RawExtension,
    RawExtensionAdapter,
};
use warden_session::{InMemorySessionStore, OsTokenGenerator, TokenGenerator};
use warden_worker::BackgroundExecutor;

/// Profile every test app is configured with.
pub const PROFILE: &str = "test";

/// Raw extension answering each command with a canned map and recording
/// every invocation.
#[derive(Debug)]
pub struct ScriptedExtension {
    name: String,
    capabilities: Capabilities,
    responses: Mutex<HashMap<InvokeCommand, ExtMap>>,
    calls: Mutex<Vec<ExtMap>>,
}

impl ScriptedExtension {
    /// An extension without canned responses. Unscripted mapping and
    /// principal commands answer an empty success; unscripted
    /// authentication answers `GENERAL_ERROR`.
    pub fn new(name: &str, capabilities: Capabilities) -> Self {
        Self {
            name: name.to_string(),
            capabilities,
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sets the answer to `command`.
    pub fn respond(self, command: InvokeCommand, output: ExtMap) -> Self {
        self.responses.lock().unwrap().insert(command, output);
        self
    }

    /// Every request received, oldest first.
    pub fn calls(&self) -> Vec<ExtMap> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands received, oldest first.
    pub fn commands(&self) -> Vec<InvokeCommand> {
        self.calls()
            .iter()
            .map(|call| InvokeCommand::from_map(call).unwrap())
            .collect()
    }
}

#[async_trait]
impl RawExtension for ScriptedExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn invoke(&self, input: ExtMap) -> AppResult<ExtMap> {
        let command = InvokeCommand::from_map(&input)?;
        self.calls.lock().unwrap().push(input);

        let scripted = self.responses.lock().unwrap().get(&command).cloned();
        Ok(scripted.unwrap_or_else(|| match command {
            InvokeCommand::AuthenticateCredentials => ExtMap::new().with(keys::RESULT, 1),
            _ => ExtMap::new().with(keys::RESULT, 0),
        }))
    }
}

/// Capabilities of an ordinary password authenticator.
pub fn password_capabilities() -> Capabilities {
    Capabilities::AUTHENTICATE_CREDENTIALS | Capabilities::AUTHENTICATE_PASSWORD
}

/// Successful authentication of `principal`.
pub fn authn_success(principal: &str) -> ExtMap {
    authn_success_with(json!({ "PRINCIPAL": principal }))
}

/// Successful authentication carrying `auth_record`.
pub fn authn_success_with(auth_record: Value) -> ExtMap {
    ExtMap::new()
        .with(keys::RESULT, 0)
        .with(keys::AUTH_RECORD, auth_record)
}

/// Failed authentication with result `code`.
pub fn authn_failure(code: i64) -> ExtMap {
    ExtMap::new().with(keys::RESULT, code)
}

/// Principal record response for `name`, member of `groups`.
pub fn principal_found(name: &str, groups: &[&str]) -> ExtMap {
    let groups: Vec<Value> = groups
        .iter()
        .map(|group| json!({ "ID": format!("gid-{group}"), "NAME": group }))
        .collect();
    ExtMap::new().with(keys::RESULT, 0).with(
        keys::PRINCIPAL_RECORD,
        json!({
            "ID": format!("uid-{name}"),
            "NAME": name,
            "PRINCIPAL": name,
            "NAMESPACE": "dc=test",
            "GROUPS": groups,
        }),
    )
}

/// Test application context
pub struct TestApp {
    /// The command under test
    pub login: LoginCommand,
    pub authn: Arc<ScriptedExtension>,
    pub authz: Arc<ScriptedExtension>,
    pub mapper: Option<Arc<ScriptedExtension>>,
    pub sessions: Arc<InMemorySessionStore>,
    pub directory: Arc<MemoryUserDirectory>,
    pub audit: Arc<MemoryAuditLog>,
    pub accounting: Arc<MemoryAccountingSink>,
    shutdown_tx: watch::Sender<bool>,
}

impl TestApp {
    /// Start building a test application
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// App whose authenticator accepts `user` and whose authorizer knows it.
    pub async fn accepting(user: &str) -> Self {
        Self::builder()
            .authn(
                ScriptedExtension::new("test-authn", password_capabilities())
                    .respond(InvokeCommand::AuthenticateCredentials, authn_success(user)),
            )
            .authz(
                ScriptedExtension::new("test-authz", Capabilities::empty())
                    .respond(InvokeCommand::FetchPrincipalRecord, principal_found(user, &[])),
            )
            .build()
            .await
    }

    /// Waits until the local user `external_id` has an admin check recorded.
    pub async fn wait_for_admin_check(&self, external_id: &str) -> bool {
        for _ in 0..100 {
            let user = self
                .directory
                .find_by_external_id("test-authz", external_id)
                .await
                .unwrap();
            if user.and_then(|u| u.last_admin_check).is_some() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Builder for [`TestApp`].
pub struct TestAppBuilder {
    authn: ScriptedExtension,
    authz: ScriptedExtension,
    mapper: Option<ScriptedExtension>,
    permissions: PermissionConfig,
    session: SessionConfig,
    tokens: Arc<dyn TokenGenerator>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            authn: ScriptedExtension::new("test-authn", password_capabilities()),
            authz: ScriptedExtension::new("test-authz", Capabilities::empty()),
            mapper: None,
            permissions: PermissionConfig {
                allow_everyone: true,
                ..PermissionConfig::default()
            },
            session: SessionConfig::default(),
            tokens: Arc::new(OsTokenGenerator),
        }
    }
}

impl TestAppBuilder {
    pub fn authn(mut self, authn: ScriptedExtension) -> Self {
        self.authn = authn;
        self
    }

    pub fn authz(mut self, authz: ScriptedExtension) -> Self {
        self.authz = authz;
        self
    }

    pub fn mapper(mut self, mapper: ScriptedExtension) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn permissions(mut self, permissions: PermissionConfig) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn tokens(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub async fn build(self) -> TestApp {
        let authn = Arc::new(self.authn);
        let authz = Arc::new(self.authz);
        let mapper = self.mapper.map(Arc::new);

        let profile = AuthenticationProfile::new(
            PROFILE,
            RawExtensionAdapter::authenticator(authn.clone()),
            RawExtensionAdapter::authorizer(authz.clone()),
            mapper
                .clone()
                .map(|mapper| RawExtensionAdapter::mapper(mapper)),
        );
        let profiles =
            ProfileRepository::from_profiles([profile]).expect("Failed to build profiles");

        let sessions = Arc::new(InMemorySessionStore::new());
        let directory = Arc::new(MemoryUserDirectory::new());
        let audit = Arc::new(MemoryAuditLog::new());
        let accounting = Arc::new(MemoryAccountingSink::new());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (executor, _handle) = BackgroundExecutor::start(&WorkerConfig::default(), shutdown_rx);

        let login = LoginCommand::new(LoginDependencies {
            profiles: Arc::new(profiles),
            sessions: sessions.clone(),
            tokens: self.tokens,
            directory: directory.clone(),
            permissions: Arc::new(StaticPermissionTable::from_config(&self.permissions)),
            audit: audit.clone(),
            accounting: AccountingDispatcher::new().with_sink(accounting.clone()),
            background: Some(executor),
            session: self.session,
        });

        TestApp {
            login,
            authn,
            authz,
            mapper,
            sessions,
            directory,
            audit,
            accounting,
            shutdown_tx,
        }
    }
}
