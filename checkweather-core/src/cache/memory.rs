use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use super::{CacheStore, decode_entry, encode_entry};
use crate::model::WeatherData;

#[derive(Debug)]
struct Entry {
    json: String,
    expires_at: Instant,
}

/// In-process cache holding the same JSON text a Redis entry would.
///
/// Expired entries are dropped when read and swept on every write, so keys
/// that are never looked up again do not pile up.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key`, bypassing serialization.
    pub fn insert_raw(&self, key: &str, json: impl Into<String>, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                json: json.into(),
                expires_at: now + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<WeatherData> {
        let json = {
            let mut entries = self.entries.lock();
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => entry.json.clone(),
                Some(_) => {
                    entries.remove(key);
                    tracing::debug!(key, "cache entry expired");
                    return None;
                }
                None => return None,
            }
        };

        decode_entry(key, &json)
    }

    async fn put(&self, key: &str, value: &WeatherData, ttl: Duration) {
        if let Some(json) = encode_entry(key, value) {
            self.insert_raw(key, json, ttl);
        }
    }
}
