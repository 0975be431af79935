//! # utilkit-store
//!
//! Local-storage style key/value access for Rust programs.
//!
//! [`LocalStorage`] is the accessor callers use: `set_item`, `get_item`,
//! `remove_item`. It serializes structured values to JSON text on write and
//! parses them back on read. Where the text lives is decided by the
//! [`StoragePort`] it wraps:
//!
//! | Port              | Backing                    | Survives restart |
//! |-------------------|----------------------------|------------------|
//! | [`MemoryStorage`] | `HashMap` behind `RwLock`  | no               |
//! | [`SqliteStorage`] | SQLite `kv_entries` table  | yes              |
//!
//! ## Quick start
//!
//! ```ignore
//! use serde_json::json;
//! use utilkit_store::{LocalStorage, SqliteStorage};
//!
//! let storage = LocalStorage::new(SqliteStorage::open("data/utilkit.db")?);
//! storage.set_item("user", &json!({"name": "ada"}))?;
//! let user = storage.get_item(Some("user"))?;
//! storage.remove_item("user")?;
//! ```

pub mod accessor;
pub mod error;
pub mod memory;
pub mod migration;
pub mod port;
pub mod sqlite;

// ── re-exports ───────────────────────────────────────────────────────

pub use accessor::{encode_value, LocalStorage, ParsePolicy};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStorage;
pub use port::StoragePort;
pub use sqlite::SqliteStorage;
