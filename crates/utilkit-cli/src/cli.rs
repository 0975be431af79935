//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use utilkit_color::ColorFormat;

/// utilkit: storage, color and timing helpers from the terminal.
#[derive(Debug, Parser)]
#[command(name = "utilkit", version, about = "Storage, color and timing helpers")]
pub struct Cli {
    /// Config file (defaults to $UTILKIT_CONFIG, then config/utilkit.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite store path, or `:memory:`.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read and write the persistent key/value store.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Print random colors.
    Color {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Feed a burst of events through a debounce or throttle wrapper.
    Pulse(PulseArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum StoreAction {
    /// Store a value. Plain text unless --json is given.
    Set {
        key: String,
        value: String,
        /// Parse VALUE as JSON before storing it.
        #[arg(long)]
        json: bool,
    },
    /// Print the stored value as JSON (`null` if absent).
    Get { key: String },
    /// Delete a key.
    Remove { key: String },
    /// Delete every key.
    Clear,
    /// List stored keys.
    Keys,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Rgb,
    Hex,
}

impl From<FormatArg> for ColorFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Rgb => Self::Rgb,
            FormatArg::Hex => Self::Hex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PulseMode {
    /// Trailing-edge debounce.
    Debounce,
    /// Leading-edge debounce.
    Leading,
    Throttle,
}

#[derive(Debug, Clone, Args)]
pub struct PulseArgs {
    #[arg(long, value_enum, default_value_t = PulseMode::Debounce)]
    pub mode: PulseMode,

    /// Number of events in the burst.
    #[arg(long, default_value_t = 10)]
    pub events: u32,

    /// Gap between events.
    #[arg(long, default_value_t = 20)]
    pub interval_ms: u64,

    /// Debounce wait or throttle delay; defaults to the configured value.
    #[arg(long)]
    pub window_ms: Option<u64>,
}
