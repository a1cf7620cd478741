//! Expiring key-value storage for short-lived viewer state.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// An expiring string store (Redis or in-process).
///
/// Every entry carries its own lifetime. Implementations own key
/// namespacing; callers pass bare keys.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The live value under `key`, if any.
    async fn fetch(&self, key: &str) -> AppResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value and lifetime.
    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Write `value` under `key` only if no live entry exists. Returns
    /// whether this call wrote it.
    async fn store_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Drop `key`. Missing keys are not an error.
    async fn evict(&self, key: &str) -> AppResult<()>;

    /// Whether the backend answers.
    async fn ping(&self) -> AppResult<bool>;
}
