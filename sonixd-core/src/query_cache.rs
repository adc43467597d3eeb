//! Time-boxed cache of remote query results.
//!
//! Entries are keyed by a deterministic string built from the server id and
//! the serialized query, so identical requests share one entry. Failed
//! fetches are never stored. Stale entries are dropped on every insert and
//! the map never holds more than `max_entries` values.

use crate::config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// Key for an album list page on a server.
    pub fn album_list<Q: Serialize>(server_id: &str, query: &Q) -> Self {
        Self::new(server_id, "albums:list", query)
    }

    pub fn genre_list(server_id: &str) -> Self {
        Self(format!("{}:genres:list", server_id))
    }

    fn new<Q: Serialize>(server_id: &str, scope: &str, query: &Q) -> Self {
        // Struct fields serialize in declaration order, so equal queries give equal keys
        let query = serde_json::to_string(query).unwrap_or_default();
        Self(format!("{}:{}:{}", server_id, scope, query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

pub struct QueryCache<V> {
    stale_time: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<QueryKey, CacheEntry<V>>>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_time: Duration) -> Self {
        Self::with_max_entries(stale_time, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(stale_time: Duration, max_entries: usize) -> Self {
        Self {
            stale_time,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::with_capacity(max_entries.min(64))),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_max_entries(config.query_stale_time(), config.query_cache_max_entries)
    }

    /// Cached value if it is younger than the stale time.
    pub fn get(&self, key: &QueryKey) -> Option<V> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() < self.stale_time)
            .map(|e| e.value.clone())
    }

    pub fn insert(&self, key: QueryKey, value: V) {
        let mut entries = self.entries.lock().unwrap();

        let before = entries.len();
        entries.retain(|_, e| e.stored_at.elapsed() < self.stale_time);
        if entries.len() < before {
            debug!("Evicted {} stale queries", before - entries.len());
        }

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Return the fresh cached value for `key`, or run `fetcher` and cache its
    /// result.
    pub async fn fetch_query<F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Query cache hit: {}", key.as_str());
            return Ok(value);
        }

        let value = fetcher().await?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }
}
