//! In-memory TTL cache for aggregated results
//!
//! Backed by `moka`. Values are handed out as clones (use `Arc` payloads for
//! cheap snapshots), so callers never observe later mutation. Misses are
//! single-flight per key: concurrent callers for the same key wait for the
//! first producer and then read its result. Failed producers store nothing,
//! and expired entries are never served.

use crate::types::Result;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

pub struct TtlCache<T: Clone + Send + Sync + 'static> {
    entries: Cache<String, T>,
}

impl<T: Clone + Send + Sync + 'static> TtlCache<T> {
    /// `ttl = None` keeps entries until invalidated
    pub fn new(ttl: Option<Duration>) -> Self {
        let builder = Cache::builder();
        let entries = match ttl {
            Some(ttl) => builder.time_to_live(ttl).build(),
            None => builder.build(),
        };
        Self { entries }
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.get(key)
    }

    pub fn insert(&self, key: &str, value: T) {
        self.entries.insert(key.to_string(), value);
    }

    /// Return the cached value or run `producer` and cache its success.
    pub fn get_or_compute<F>(&self, key: &str, producer: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.entries.get(key) {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        self.entries
            .try_get_with(key.to_string(), || {
                tracing::debug!(key, "cache miss");
                producer()
            })
            .map_err(|shared| Arc::try_unwrap(shared).unwrap_or_else(|e| e.duplicate()))
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.invalidate(key);
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
