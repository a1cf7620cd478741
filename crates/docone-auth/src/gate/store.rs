//! Gate state keyed by browser session and link code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use docone_cache::CacheManager;
use docone_cache::keys;
use docone_core::result::AppResult;
use docone_core::traits::CacheProvider;
use docone_entity::gate::GateState;

/// Records what one browser session has satisfied for one link.
///
/// State for different link codes is independent even within the same
/// browser session.
#[async_trait]
pub trait GateStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the state, or the empty state if none was recorded.
    async fn load(&self, viewer: &str, link_code: &str) -> AppResult<GateState>;

    /// Persist the state.
    async fn save(&self, viewer: &str, link_code: &str, state: &GateState) -> AppResult<()>;

    /// Forget the state.
    async fn clear(&self, viewer: &str, link_code: &str) -> AppResult<()>;

    /// Take the admission lock for this browser session and link. Returns
    /// `false` while another request holds it.
    async fn begin_admission(&self, viewer: &str, link_code: &str) -> AppResult<bool>;

    /// Release the admission lock.
    async fn end_admission(&self, viewer: &str, link_code: &str) -> AppResult<()>;
}

/// Upper bound on how long a crashed admission keeps the lock.
const ADMISSION_LOCK_TTL: Duration = Duration::from_secs(30);

/// [`GateStore`] serializing state as JSON into the cache.
#[derive(Debug, Clone)]
pub struct CacheGateStore {
    cache: Arc<CacheManager>,
    lifetime: Duration,
}

impl CacheGateStore {
    /// Entries expire `lifetime` after their last save.
    pub fn new(cache: Arc<CacheManager>, lifetime: Duration) -> Self {
        Self { cache, lifetime }
    }
}

#[async_trait]
impl GateStore for CacheGateStore {
    async fn load(&self, viewer: &str, link_code: &str) -> AppResult<GateState> {
        let state: Option<GateState> = self
            .cache
            .fetch_json(&keys::gate_state(viewer, link_code))
            .await?;
        Ok(state.unwrap_or_default())
    }

    async fn save(&self, viewer: &str, link_code: &str, state: &GateState) -> AppResult<()> {
        self.cache
            .store_json(&keys::gate_state(viewer, link_code), state, self.lifetime)
            .await
    }

    async fn clear(&self, viewer: &str, link_code: &str) -> AppResult<()> {
        self.cache.evict(&keys::gate_state(viewer, link_code)).await
    }

    async fn begin_admission(&self, viewer: &str, link_code: &str) -> AppResult<bool> {
        self.cache
            .store_if_absent(
                &keys::admission_lock(viewer, link_code),
                "1",
                ADMISSION_LOCK_TTL,
            )
            .await
    }

    async fn end_admission(&self, viewer: &str, link_code: &str) -> AppResult<()> {
        self.cache
            .evict(&keys::admission_lock(viewer, link_code))
            .await
    }
}
