//! Settings for the store holding viewer gate state.

use serde::{Deserialize, Serialize};

/// Backend selection for expiring viewer state.
///
/// Gate facts must be visible to every instance serving viewers, so
/// deployments with more than one instance need `"redis"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `"memory"` or `"redis"`.
    pub provider: String,
    /// Lifetime in seconds for entries written without an explicit one.
    pub default_ttl_seconds: u64,
    pub redis: RedisCacheConfig,
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: "memory".into(),
            default_ttl_seconds: 3600,
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisCacheConfig {
    pub url: String,
    /// Prepended to every key, for sharing one Redis database between
    /// deployments.
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".into(),
            key_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCacheConfig {
    /// Upper bound on live entries; the least useful are evicted first.
    pub max_capacity: u64,
    /// Hard cap on any entry's lifetime, in seconds.
    pub time_to_live_seconds: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
            time_to_live_seconds: 86_400,
        }
    }
}
