//! Logging initialisation and assembly of the login core from configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use warden_auth::{
    AccountingDispatcher, LoginCommand, LoginDependencies, StaticPermissionTable,
    TracingAccountingSink, TracingAuditLog,
};
use warden_core::AppResult;
use warden_core::config::{AppConfig, LoggingConfig};
use warden_database::{DatabasePool, MemoryUserDirectory, PgUserDirectory, UserDirectory};
use warden_extension::builtin::register_builtins;
use warden_extension::{ExtensionRegistry, ProfileRepository};
use warden_session::{InMemorySessionStore, OsTokenGenerator, SessionCleanup, SessionStore};
use warden_worker::BackgroundExecutor;

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the
/// configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// The assembled login core.
#[derive(Debug)]
pub struct Warden {
    config: AppConfig,
    login: LoginCommand,
    directory: Arc<dyn UserDirectory>,
    database: Option<DatabasePool>,
    shutdown_tx: watch::Sender<bool>,
    worker_handle: JoinHandle<()>,
}

impl Warden {
    /// Builds the core with only the built-in extensions.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        Self::with_registry(config, ExtensionRegistry::new()).await
    }

    /// Builds the core on top of `registry`, which may already hold
    /// externally provided extensions. Built-ins are added to it before the
    /// profiles are resolved. Must be called inside a tokio runtime.
    pub async fn with_registry(config: AppConfig, registry: ExtensionRegistry) -> AppResult<Self> {
        info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

        register_builtins(&config.extensions, &registry).await?;
        let profiles = Arc::new(ProfileRepository::build(&config.profiles, &registry).await?);
        info!(
            profiles = profiles.len(),
            extensions = registry.count().await,
            "Authentication profiles loaded"
        );

        let (directory, database): (Arc<dyn UserDirectory>, Option<DatabasePool>) =
            match &config.database {
                Some(db_config) => {
                    let pool = DatabasePool::connect(db_config).await?;
                    if db_config.run_migrations {
                        warden_database::migration::run_migrations(pool.pool()).await?;
                    }
                    (Arc::new(PgUserDirectory::new(pool.pool().clone())), Some(pool))
                }
                None => {
                    info!("No database configured, using in-memory user directory");
                    (Arc::new(MemoryUserDirectory::new()), None)
                }
            };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (executor, worker_handle) = BackgroundExecutor::start(&config.worker, shutdown_rx);

        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let login = LoginCommand::new(LoginDependencies {
            profiles,
            sessions,
            tokens: Arc::new(OsTokenGenerator),
            directory: directory.clone(),
            permissions: Arc::new(StaticPermissionTable::from_config(&config.permissions)),
            audit: Arc::new(TracingAuditLog),
            accounting: AccountingDispatcher::new().with_sink(Arc::new(TracingAccountingSink)),
            background: Some(executor),
            session: config.session.clone(),
        });

        Ok(Self {
            config,
            login,
            directory,
            database,
            shutdown_tx,
            worker_handle,
        })
    }

    /// The login command.
    pub fn login(&self) -> &LoginCommand {
        &self.login
    }

    /// The session store.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.login.sessions()
    }

    /// The local user directory.
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// The loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Starts the periodic session cleanup loop. It stops on [`Warden::shutdown`].
    pub fn spawn_session_cleanup(&self) -> JoinHandle<()> {
        SessionCleanup::new(self.sessions().clone(), &self.config.session)
            .spawn_periodic(self.shutdown_tx.subscribe())
    }

    /// Stops background loops and waits for queued bookkeeping to drain.
    pub async fn shutdown(self) {
        info!("Shutting down Warden");
        let _ = self.shutdown_tx.send(true);
        drop(self.login);
        if tokio::time::timeout(Duration::from_secs(30), self.worker_handle)
            .await
            .is_err()
        {
            warn!("Background worker did not stop in time");
        }
        if let Some(database) = self.database {
            database.close().await;
        }
        info!("Warden shut down");
    }
}
