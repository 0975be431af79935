//! In-memory storage port.
//!
//! A `HashMap` behind an `RwLock`. Nothing survives the process; meant
//! for tests and for callers that only need the accessor's value
//! handling.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::StoreResult;
use crate::port::{check_quota, entry_size, StoragePort};

/// Volatile [`StoragePort`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty store with no quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently counted against the quota.
    pub fn used_bytes(&self) -> StoreResult<usize> {
        let entries = self.entries.read()?;
        Ok(entries.iter().map(|(k, v)| entry_size(k, v)).sum())
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write()?;
        if self.quota_bytes.is_some() {
            let used_by_others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            check_quota(self.quota_bytes, used_by_others, key, value)?;
        }
        debug!(key = %key, bytes = value.len(), "memory_storage.set");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        debug!(key = %key, "memory_storage.remove");
        self.entries.write()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut entries = self.entries.write()?;
        debug!(entries = entries.len(), "memory_storage.clear");
        entries.clear();
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read()?.len())
    }
}
