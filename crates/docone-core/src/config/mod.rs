//! Configuration, layered from TOML files and `DOCONE__` environment
//! variables.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;
pub mod storage;
pub mod viewer;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;
pub use self::viewer::ViewerConfig;

use crate::error::AppError;

/// Every section of the configuration. Missing sections and keys take
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Store for viewer gate state.
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub viewer: ViewerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Merge `config/default.toml`, `config/{env}.toml`, and
    /// `DOCONE__SECTION__KEY` variables, in increasing precedence, then
    /// check the result.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let layered = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCONE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("storage.allowed_extensions")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Cannot read configuration: {e}")))?;

        let config: Self = layered
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Malformed configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !matches!(self.database.provider.as_str(), "postgres" | "memory") {
            return Err(AppError::configuration(format!(
                "database.provider must be 'postgres' or 'memory', got '{}'",
                self.database.provider
            )));
        }
        if !matches!(self.cache.provider.as_str(), "redis" | "memory") {
            return Err(AppError::configuration(format!(
                "cache.provider must be 'redis' or 'memory', got '{}'",
                self.cache.provider
            )));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.viewer.cookie_name.is_empty() {
            return Err(AppError::configuration("viewer.cookie_name must not be empty"));
        }
        if self.viewer.session_lifetime_seconds == 0 {
            return Err(AppError::configuration(
                "viewer.session_lifetime_seconds must be positive",
            ));
        }
        Ok(())
    }
}
