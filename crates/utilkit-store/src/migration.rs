//! Versioned schema for the SQLite port.
//!
//! Each applied step is recorded in `_migrations`, so opening an existing
//! database only runs the steps it has not seen.

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// `(version, sql)` pairs, ascending. Append only.
const SCHEMA: &[(u32, &str)] = &[(
    1,
    "CREATE TABLE kv_entries (
         key        TEXT PRIMARY KEY NOT NULL,
         value      TEXT NOT NULL,
         updated_at INTEGER NOT NULL
     );",
)];

/// Bring `conn` up to the latest schema version.
pub fn run_all(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
             version    INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL
         );",
    )
    .map_err(failed(0, "create _migrations"))?;

    let current = current_version(conn)?;
    for &(version, sql) in SCHEMA.iter().filter(|(v, _)| *v > current) {
        // Dropping the transaction on an early return rolls it back.
        let tx = conn
            .unchecked_transaction()
            .map_err(failed(version, "begin"))?;
        tx.execute_batch(sql).map_err(failed(version, "apply"))?;
        tx.execute(
            "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, chrono::Utc::now().timestamp()],
        )
        .map_err(failed(version, "record"))?;
        tx.commit().map_err(failed(version, "commit"))?;
        info!(version, "applied storage migration");
    }

    debug!(version = current_version(conn)?, "storage schema ready");
    Ok(())
}

/// Latest applied version, 0 on a fresh database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
        row.get(0)
    })
    .map_err(failed(0, "read version"))
}

fn failed(version: u32, step: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |e| StoreError::Migration {
        version,
        message: format!("{step}: {e}"),
    }
}
