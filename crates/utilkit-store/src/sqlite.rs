//! SQLite-backed storage port.
//!
//! [`SqliteStorage`] keeps every entry in the `kv_entries` table of a
//! SQLite file, so values survive process restarts the way a browser's
//! local storage survives page reloads. The connection sits behind an
//! `Arc<Mutex<>>`; each port call is one short statement.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::migration;
use crate::port::{check_quota, StoragePort};

/// Persistent [`StoragePort`] on top of SQLite.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
    quota_bytes: Option<usize>,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("quota_bytes", &self.quota_bytes)
            .finish_non_exhaustive()
    }
}

impl SqliteStorage {
    /// Open (or create) a store at `path`, apply pragmas and migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening storage database");

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store, useful for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("opening in-memory storage database");
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Limit the total size of stored keys and values to `quota_bytes`.
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Bytes currently counted against the quota.
    pub fn used_bytes(&self) -> StoreResult<usize> {
        let conn = self.conn.lock()?;
        let used: i64 = conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_entries",
            [],
            |row| row.get(0),
        )?;
        Ok(used as usize)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        Self::apply_pragmas(&conn)?;
        migration::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            quota_bytes: None,
        })
    }

    fn apply_pragmas(conn: &Connection) -> StoreResult<()> {
        // WAL mode: concurrent readers, non-blocking writes.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        // Wait on a concurrent writer instead of failing immediately.
        conn.pragma_update(None, "busy_timeout", 5_000_i32)?;
        debug!("storage pragmas applied");
        Ok(())
    }
}

impl StoragePort for SqliteStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        if self.quota_bytes.is_some() {
            let used_by_others: i64 = conn.query_row(
                "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
                 FROM kv_entries WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )?;
            check_quota(self.quota_bytes, used_by_others as usize, key, value)?;
        }

        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp()],
        )?;
        debug!(key = %key, bytes = value.len(), "sqlite_storage.set");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        let removed = conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        debug!(key = %key, removed, "sqlite_storage.remove");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        let removed = conn.execute("DELETE FROM kv_entries", [])?;
        debug!(removed, "sqlite_storage.clear");
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn len(&self) -> StoreResult<usize> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row("SELECT count(*) FROM kv_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
