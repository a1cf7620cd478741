//! Shared backend on Redis, for deployments with more than one instance.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Stores each entry as a plain string with a millisecond expiry.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

fn redis_error(op: &'static str) -> impl FnOnce(redis::RedisError) -> AppError {
    move |e| AppError::with_source(ErrorKind::Cache, format!("Redis {op} failed"), e)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        self.client
            .conn()
            .get(self.client.namespaced(key))
            .await
            .map_err(redis_error("GET"))
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        // PSETEX rejects a zero expiry.
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        self.client
            .conn()
            .pset_ex::<_, _, ()>(self.client.namespaced(key), value, millis)
            .await
            .map_err(redis_error("PSETEX"))
    }

    async fn store_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.client.namespaced(key))
            .arg(value)
            .arg("PX")
            .arg(millis)
            .arg("NX")
            .query_async(&mut self.client.conn())
            .await
            .map_err(redis_error("SET NX"))?;
        Ok(reply.is_some())
    }

    async fn evict(&self, key: &str) -> AppResult<()> {
        self.client
            .conn()
            .del::<_, ()>(self.client.namespaced(key))
            .await
            .map_err(redis_error("DEL"))
    }

    async fn ping(&self) -> AppResult<bool> {
        let reply: String = redis::cmd("PING")
            .query_async(&mut self.client.conn())
            .await
            .map_err(redis_error("PING"))?;
        Ok(reply == "PONG")
    }
}
