//! Key/Value Storage
//!
//! Persistent string storage in the `localStorage` mould, bounded by a quota.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Storage error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage quota exceeded ({used} of {quota} bytes)")]
    QuotaExceeded { used: usize, quota: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent key/value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value; fails with `QuotaExceeded` when it does not fit
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is a no-op returning false
    fn remove(&mut self, key: &str) -> bool;

    fn keys(&self) -> Vec<String>;
}

/// In-memory store with a byte quota and an optional entry quota
#[derive(Debug)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota_bytes: usize,
    max_entries: Option<usize>,
    used_bytes: usize,
}

impl MemoryStorage {
    /// 5 MiB, the usual per-origin `localStorage` budget
    pub const DEFAULT_QUOTA: usize = 5 * 1024 * 1024;

    pub fn new(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes,
            max_entries: None,
            used_bytes: 0,
        }
    }

    /// Also cap the number of stored keys
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Wrap for sharing between the cache and an observer
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cost(key: &str, value: &str) -> usize {
        key.len() + value.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUOTA)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.entries.get(key).map(|old| Self::cost(key, old));
        let used = self.used_bytes - previous.unwrap_or(0) + Self::cost(key, value);

        let over_entries = previous.is_none()
            && self.max_entries.is_some_and(|max| self.entries.len() >= max);
        if used > self.quota_bytes || over_entries {
            return Err(StorageError::QuotaExceeded {
                used: self.used_bytes,
                quota: self.quota_bytes,
            });
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.used_bytes = used;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(old) => {
                self.used_bytes -= Self::cost(key, &old);
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl<S: KeyValueStore> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Option<String> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> bool {
        self.borrow_mut().remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.borrow().keys()
    }
}
