//! Process-local backend on a moka future cache.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use docone_core::config::cache::MemoryCacheConfig;
use docone_core::result::AppResult;
use docone_core::traits::cache::CacheProvider;

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    ttl: Duration,
}

/// Each slot lives for the TTL it was last written with.
struct SlotExpiry;

impl Expiry<String, Slot> for SlotExpiry {
    fn expire_after_create(&self, _key: &String, slot: &Slot, _at: Instant) -> Option<Duration> {
        Some(slot.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        slot: &Slot,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(slot.ttl)
    }
}

/// Bounded in-process store. State is lost on restart and not shared
/// between instances.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    slots: Cache<String, Slot>,
}

impl MemoryCacheProvider {
    /// `time_to_live_seconds` caps every slot regardless of its own TTL.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let slots = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .expire_after(SlotExpiry)
            .build();
        Self { slots }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.slots.get(key).await.map(|slot| slot.value))
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let slot = Slot {
            value: value.to_owned(),
            ttl,
        };
        self.slots.insert(key.to_owned(), slot).await;
        Ok(())
    }

    async fn store_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let slot = Slot {
            value: value.to_owned(),
            ttl,
        };
        let entry = self
            .slots
            .entry(key.to_owned())
            .or_insert_with(async move { slot })
            .await;
        Ok(entry.is_fresh())
    }

    async fn evict(&self, key: &str) -> AppResult<()> {
        self.slots.invalidate(key).await;
        Ok(())
    }

    async fn ping(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig {
            max_capacity: 100,
            time_to_live_seconds: 60,
        })
    }

    #[tokio::test]
    async fn test_store_fetch_evict() {
        let backend = backend();
        backend
            .store("gate", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.fetch("gate").await.unwrap().as_deref(), Some("{}"));

        backend.evict("gate").await.unwrap();
        assert_eq!(backend.fetch("gate").await.unwrap(), None);
        backend.evict("gate").await.unwrap();
    }

    #[tokio::test]
    async fn test_slot_expires_after_its_ttl() {
        let backend = backend();
        backend
            .store("short", "v", Duration::from_millis(50))
            .await
            .unwrap();
        backend
            .store("long", "v", Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(backend.fetch("short").await.unwrap(), None);
        assert!(backend.fetch("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_if_absent_admits_one_writer() {
        let backend = backend();
        let attempts = (0..8).map(|i| {
            let backend = backend.clone();
            async move {
                backend
                    .store_if_absent("lock", &i.to_string(), Duration::from_secs(60))
                    .await
                    .unwrap()
            }
        });
        let won = futures::future::join_all(attempts)
            .await
            .into_iter()
            .filter(|won| *won)
            .count();
        assert_eq!(won, 1);

        backend.evict("lock").await.unwrap();
        assert!(
            backend
                .store_if_absent("lock", "again", Duration::from_secs(60))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_rewrite_replaces_ttl() {
        let backend = backend();
        backend
            .store("k", "old", Duration::from_secs(60))
            .await
            .unwrap();
        backend
            .store("k", "new", Duration::from_millis(50))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(backend.fetch("k").await.unwrap(), None);
    }
}
