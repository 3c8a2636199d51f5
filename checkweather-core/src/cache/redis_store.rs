use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::{fmt, time::Duration};

use super::{CacheStore, decode_entry, encode_entry};
use crate::model::WeatherData;

/// Redis-backed store using `GET` / `SET EX`.
///
/// The connection manager reconnects on its own, so a Redis outage turns
/// every read into a miss instead of failing lookups.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("redis_url", &self.redis_url)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Open a managed connection, giving up after `timeout`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self> {
        tracing::info!(redis_url, ?timeout, "connecting to redis");
        let client = redis::Client::open(redis_url)
            .with_context(|| format!("Invalid Redis URL: {redis_url}"))?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| anyhow!("Timed out connecting to Redis at {redis_url} after {timeout:?}"))?
            .with_context(|| format!("Failed to connect to Redis at {redis_url}"))?;

        Ok(Self {
            conn,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Option<WeatherData> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => decode_entry(key, &raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "redis GET failed, treating as miss");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &WeatherData, ttl: Duration) {
        let Some(json) = encode_entry(key, value) else {
            return;
        };

        let mut conn = self.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, json, ttl.as_secs()).await {
            tracing::warn!(key, error = %e, "redis SETEX failed");
        }
    }
}
