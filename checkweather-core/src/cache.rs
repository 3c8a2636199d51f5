//! Time-bounded storage for normalized lookups.
//!
//! Entries are stored as the JSON form of [`WeatherData`]. A stored value that
//! no longer decodes is reported as absent: a bad entry must never fail the
//! request that reads it.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::model::WeatherData;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryCache;
pub use redis_store::RedisCache;

#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    /// Unexpired, decodable entry for `key`, if any.
    async fn get(&self, key: &str) -> Option<WeatherData>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    /// Write failures are logged, not returned.
    async fn put(&self, key: &str, value: &WeatherData, ttl: Duration);
}

pub(crate) fn encode_entry(key: &str, value: &WeatherData) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize cache entry");
            None
        }
    }
}

pub(crate) fn decode_entry(key: &str, raw: &str) -> Option<WeatherData> {
    match serde_json::from_str(raw) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding undecodable cache entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_schema_mismatch() {
        assert!(decode_entry("weather:x", "{\"location\": 3}").is_none());
        assert!(decode_entry("weather:x", "not json").is_none());
    }
}
