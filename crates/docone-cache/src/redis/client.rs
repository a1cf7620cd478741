//! Redis connection and key namespace.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use docone_core::config::cache::RedisCacheConfig;
use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;

/// A self-healing connection shared by clones, plus the namespace every
/// key is written under.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    namespace: String,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Cache, "Redis is unreachable", e))?;

        info!(namespace = %config.key_prefix, "Redis connection established");
        Ok(Self {
            conn,
            namespace: config.key_prefix.clone(),
        })
    }

    pub fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }

    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }
}
