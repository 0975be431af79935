//! Shared helper functions used across CLI subcommands.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utilkit_store::{LocalStorage, SqliteStorage};

use crate::config::{StoreConfig, IN_MEMORY_STORE};

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Open the configured SQLite store and wrap it in the JSON accessor.
///
/// Creates the parent directory of a file-backed store if needed.
pub fn open_storage(config: &StoreConfig) -> Result<LocalStorage<SqliteStorage>> {
    let port = if config.path.as_os_str() == IN_MEMORY_STORE {
        SqliteStorage::open_in_memory().context("failed to open in-memory store")?
    } else {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        SqliteStorage::open(&config.path)
            .with_context(|| format!("failed to open store {}", config.path.display()))?
    };

    info!(
        path = %config.path.display(),
        policy = %config.parse_policy,
        quota = ?config.quota_bytes,
        "storage ready"
    );
    Ok(LocalStorage::with_policy(
        port.with_quota(config.quota_bytes),
        config.parse_policy,
    ))
}
