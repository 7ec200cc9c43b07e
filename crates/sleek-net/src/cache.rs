//! API Response Cache
//!
//! Namespaced response entries kept in a [`KeyValueStore`] with lazy TTL
//! expiry and half-eviction when the store runs out of quota.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CachePolicy, Clock, KeyValueStore, Request, Response, StorageError};

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Prefix for every key the cache owns in the backing store
    pub namespace: String,
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
    pub policy: CachePolicy,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "sleek-cache:".to_string(),
            ttl_secs: 300,
            policy: CachePolicy::default(),
        }
    }
}

/// Cached response entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    /// Response body
    pub payload: String,
    pub content_type: String,
    /// Epoch milliseconds at write time
    pub stored_at: u64,
    /// Time to live in milliseconds
    pub ttl_ms: u64,
}

impl CacheEntry {
    /// Fresh while `now - stored_at < ttl`
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at) < self.ttl_ms
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        !self.is_fresh(now_ms)
    }

    /// Rebuild a 200 response marked as served from cache
    pub fn to_response(&self) -> Response {
        let mut response = Response::ok_with(&self.content_type, self.payload.as_bytes());
        response.from_cache = true;
        response
    }
}

/// Result of a cache write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored,
    /// First attempt hit the quota; stored after one eviction sweep
    StoredAfterEviction,
    /// Abandoned; the request behaves as a plain miss
    Dropped,
}

/// TTL cache over a key/value store
pub struct CacheStore {
    storage: Box<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    namespace: String,
    ttl_ms: u64,
}

impl CacheStore {
    /// Create a store with the default namespace and TTL
    pub fn new(storage: impl KeyValueStore + 'static, clock: Rc<dyn Clock>) -> Self {
        Self::with_config(storage, clock, &CacheConfig::default())
    }

    pub fn with_config(
        storage: impl KeyValueStore + 'static,
        clock: Rc<dyn Clock>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            clock,
            namespace: config.namespace.clone(),
            ttl_ms: config.ttl().as_millis() as u64,
        }
    }

    /// Cache key for a request
    pub fn request_key(request: &Request) -> String {
        format!("{} {}", request.method.as_str(), request.url)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Store a payload, evicting once on quota exhaustion
    pub fn put(&mut self, key: &str, payload: &str, content_type: &str) -> WriteOutcome {
        let entry = CacheEntry {
            key: key.to_string(),
            payload: payload.to_string(),
            content_type: content_type.to_string(),
            stored_at: self.clock.now_ms(),
            ttl_ms: self.ttl_ms,
        };
        let serialized = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(key, "cache entry not serializable: {}", e);
                return WriteOutcome::Dropped;
            }
        };

        let storage_key = self.storage_key(key);
        match self.storage.set(&storage_key, &serialized) {
            Ok(()) => WriteOutcome::Stored,
            Err(StorageError::QuotaExceeded { .. }) => {
                let evicted = self.evict();
                tracing::debug!(key, evicted, "cache quota exceeded, retrying write");
                match self.storage.set(&storage_key, &serialized) {
                    Ok(()) => WriteOutcome::StoredAfterEviction,
                    Err(e) => {
                        tracing::warn!(key, "cache write dropped: {}", e);
                        WriteOutcome::Dropped
                    }
                }
            }
            Err(e) => {
                tracing::warn!(key, "cache write dropped: {}", e);
                WriteOutcome::Dropped
            }
        }
    }

    /// Get a fresh entry; stale or unreadable entries are deleted
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let storage_key = self.storage_key(key);
        let raw = self.storage.get(&storage_key)?;

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.is_fresh(self.clock.now_ms()) => Some(entry),
            Ok(_) => {
                tracing::debug!(key, "cache entry expired");
                self.storage.remove(&storage_key);
                None
            }
            Err(e) => {
                tracing::debug!(key, "dropping unreadable cache entry: {}", e);
                self.storage.remove(&storage_key);
                None
            }
        }
    }

    /// Check for a fresh entry without purging
    pub fn contains(&self, key: &str) -> bool {
        self.storage
            .get(&self.storage_key(key))
            .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
            .is_some_and(|entry| entry.is_fresh(self.clock.now_ms()))
    }

    /// Remove the oldest half (rounded up) of the namespaced entries
    pub fn evict(&mut self) -> usize {
        let mut ledger: Vec<(u64, String)> = self
            .namespaced_keys()
            .into_iter()
            .map(|storage_key| {
                // Unreadable entries sort first
                let stored_at = self
                    .storage
                    .get(&storage_key)
                    .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                    .map(|entry| entry.stored_at)
                    .unwrap_or(0);
                (stored_at, storage_key)
            })
            .collect();
        ledger.sort();

        let count = ledger.len().div_ceil(2);
        for (_, storage_key) in ledger.iter().take(count) {
            self.storage.remove(storage_key);
        }
        count
    }

    /// Remove every namespaced entry
    pub fn clear(&mut self) -> usize {
        let keys = self.namespaced_keys();
        for key in &keys {
            self.storage.remove(key);
        }
        tracing::info!("Cleared {} cache entries", keys.len());
        keys.len()
    }

    /// Remove all expired or unreadable entries
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let stale: Vec<String> = self
            .namespaced_keys()
            .into_iter()
            .filter(|storage_key| {
                self.storage
                    .get(storage_key)
                    .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                    .is_none_or(|entry| entry.is_expired(now))
            })
            .collect();

        for key in &stale {
            self.storage.remove(key);
        }
        stale.len()
    }

    /// Get cache stats
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let mut stats = CacheStats::default();

        for storage_key in self.namespaced_keys() {
            let Some(raw) = self.storage.get(&storage_key) else {
                continue;
            };
            stats.entry_count += 1;
            stats.total_bytes += storage_key.len() + raw.len();
            let fresh = serde_json::from_str::<CacheEntry>(&raw).is_ok_and(|entry| entry.is_fresh(now));
            if !fresh {
                stats.stale_count += 1;
            }
        }
        stats
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    fn namespaced_keys(&self) -> Vec<String> {
        self.storage
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(&self.namespace))
            .collect()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    /// Expired or unreadable entries still in the store
    pub stale_count: usize,
    /// Bytes held in the store, keys included
    pub total_bytes: usize,
}
