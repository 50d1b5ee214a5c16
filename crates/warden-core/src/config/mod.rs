//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `WARDEN__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod database;
pub mod extension;
pub mod logging;
pub mod permission;
pub mod profile;
pub mod session;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::extension::{
    ExtensionsConfig, InternalDirectoryConfig, InternalGroupConfig, InternalUserConfig,
    MapperConfig,
};
pub use self::logging::LoggingConfig;
pub use self::permission::PermissionConfig;
pub use self::profile::ProfileConfig;
pub use self::session::SessionConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session issuance and eviction settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Local user directory database. When absent an in-memory directory is used.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Background bookkeeping worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Authentication profiles, loaded once at startup.
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
    /// Built-in extension instances.
    #[serde(default)]
    pub extensions: ExtensionsConfig,
    /// Login and admin permission table.
    #[serde(default)]
    pub permissions: PermissionConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `WARDEN__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(AppError::from)
    }
}
