//! Backend selection and typed access on top of [`CacheProvider`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use docone_core::config::cache::CacheConfig;
use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_core::traits::cache::CacheProvider;

/// The configured cache backend, shared by every service that keeps
/// expiring state.
#[derive(Debug, Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheProvider>,
    default_ttl: Duration,
}

impl CacheManager {
    /// Select and connect the backend named by `config.provider`.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let backend: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                warn!("Viewer gate state is process-local; run a single instance or use redis");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        info!(provider = %config.provider, "Cache backend ready");
        Ok(Self::from_provider(
            backend,
            Duration::from_secs(config.default_ttl_seconds),
        ))
    }

    /// Wrap an already constructed backend.
    pub fn from_provider(backend: Arc<dyn CacheProvider>, default_ttl: Duration) -> Self {
        Self {
            backend,
            default_ttl,
        }
    }

    /// Lifetime for entries whose owner has no specific one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Decode the JSON value under `key`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.backend.fetch(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON under `key`.
    pub async fn store_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.store(key, &raw, ttl).await
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        self.backend.fetch(key).await
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.backend.store(key, value, ttl).await
    }

    async fn store_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.backend.store_if_absent(key, value, ttl).await
    }

    async fn evict(&self, key: &str) -> AppResult<()> {
        self.backend.evict(key).await
    }

    async fn ping(&self) -> AppResult<bool> {
        self.backend.ping().await
    }
}
