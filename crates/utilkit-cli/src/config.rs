//! Configuration for the `utilkit` binary.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. TOML file (`--config`, `UTILKIT_CONFIG`, or `config/utilkit.toml`)
//! 3. `UTILKIT_*` environment variables
//! 4. command-line flags (applied by the caller)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utilkit_color::ColorFormat;
use utilkit_store::ParsePolicy;
use utilkit_timing::TrailingCall;

/// Config file read when no path is given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "config/utilkit.toml";

/// Path passed to the SQLite port to keep everything in memory.
pub const IN_MEMORY_STORE: &str = ":memory:";

/// Top-level configuration, one section per library plus logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub color: ColorConfig,
    pub timing: TimingConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file, or `:memory:`.
    pub path: PathBuf,
    pub parse_policy: ParsePolicy,
    /// Total bytes of keys plus values the store accepts.
    pub quota_bytes: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/utilkit.db"),
            parse_policy: ParsePolicy::Strict,
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub format: ColorFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Debounce quiet period.
    pub wait_ms: u64,
    /// Throttle window.
    pub delay_ms: u64,
    pub trailing: TrailingSetting,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wait_ms: 50,
            delay_ms: 100,
            trailing: TrailingSetting::Unbound,
        }
    }
}

/// Serializable mirror of [`TrailingCall`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingSetting {
    #[default]
    Unbound,
    LatestArgs,
}

impl From<TrailingSetting> for TrailingCall {
    fn from(setting: TrailingSetting) -> Self {
        match setting {
            TrailingSetting::Unbound => Self::Unbound,
            TrailingSetting::LatestArgs => Self::LatestArgs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicitly requested file must exist; the default location is
    /// optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os("UTILKIT_CONFIG").map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `UTILKIT_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("UTILKIT_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(policy) = lookup("UTILKIT_PARSE_POLICY") {
            self.store.parse_policy = policy
                .parse::<ParsePolicy>()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("UTILKIT_PARSE_POLICY")?;
        }
        if let Some(quota) = lookup("UTILKIT_QUOTA_BYTES") {
            self.store.quota_bytes = Some(
                quota
                    .trim()
                    .parse()
                    .with_context(|| format!("UTILKIT_QUOTA_BYTES is not a byte count: {quota}"))?,
            );
        }
        if let Some(level) = lookup("UTILKIT_LOG") {
            self.log.level = level;
        }
        Ok(())
    }
}
