//! The storage port: a synchronous, string-keyed, string-valued store.
//!
//! [`LocalStorage`](crate::LocalStorage) never talks to a concrete backend
//! directly. It is handed something implementing [`StoragePort`], which
//! lets the same accessor run against an in-memory map in tests and a
//! SQLite file in the CLI.

use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// Minimal capability set of a persistent key/value store.
///
/// Values are plain strings at this layer; any structure is the
/// accessor's concern.
pub trait StoragePort: Send + Sync {
    /// Read the raw text stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or overwrite the text stored under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Delete every entry.
    fn clear(&self) -> StoreResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Number of stored entries.
    fn len(&self) -> StoreResult<usize> {
        Ok(self.keys()?.len())
    }
}

impl<P: StoragePort + ?Sized> StoragePort for Arc<P> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }

    fn len(&self) -> StoreResult<usize> {
        (**self).len()
    }
}

impl<P: StoragePort + ?Sized> StoragePort for &P {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }

    fn len(&self) -> StoreResult<usize> {
        (**self).len()
    }
}

/// Size an entry counts against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Fail with [`StoreError::QuotaExceeded`] if writing `key`/`value` on top
/// of `used_by_others` bytes would exceed `quota`.
///
/// `used_by_others` must not include the entry currently stored under
/// `key`, since the write replaces it.
pub(crate) fn check_quota(
    quota: Option<usize>,
    used_by_others: usize,
    key: &str,
    value: &str,
) -> StoreResult<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = used_by_others + entry_size(key, value);
    if needed > quota {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}
