//! CLI entry point for utilkit.
//!
//! This binary provides the `utilkit` command with subcommands for the
//! persistent key/value store, random colors, and a timing-wrapper demo.

mod cli;
mod config;
mod helpers;
mod pulse;
mod store_commands;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use utilkit_color::{random_color, ColorFormat};

use crate::cli::{Cli, Commands, PulseArgs, PulseMode};
use crate::config::AppConfig;
use crate::helpers::{init_tracing, open_storage};
use crate::pulse::PulsePlan;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.store {
        config.store.path = path.clone();
    }

    init_tracing(&config.log.level);

    match cli.command {
        Commands::Store { action } => {
            let storage = open_storage(&config.store)?;
            let output = store_commands::run(&storage, &action)?;
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Commands::Color { format, count } => {
            cmd_color(format.map(Into::into).unwrap_or(config.color.format), count);
            Ok(())
        }
        Commands::Pulse(args) => cmd_pulse(&config, args).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommand: color
// ---------------------------------------------------------------------------

fn cmd_color(format: ColorFormat, count: usize) {
    for _ in 0..count {
        println!("{}", random_color(format));
    }
}

// ---------------------------------------------------------------------------
// Subcommand: pulse
// ---------------------------------------------------------------------------

async fn cmd_pulse(config: &AppConfig, args: PulseArgs) -> Result<()> {
    let default_window = match args.mode {
        PulseMode::Debounce | PulseMode::Leading => config.timing.wait_ms,
        PulseMode::Throttle => config.timing.delay_ms,
    };
    let plan = PulsePlan {
        mode: args.mode,
        events: args.events,
        interval: Duration::from_millis(args.interval_ms),
        window: Duration::from_millis(args.window_ms.unwrap_or(default_window)),
        trailing: config.timing.trailing.into(),
    };

    info!(
        mode = ?plan.mode,
        events = plan.events,
        interval_ms = args.interval_ms,
        window_ms = plan.window.as_millis() as u64,
        "starting pulse"
    );

    let fired = pulse::run(plan).await?;
    for firing in &fired {
        println!("{firing}");
    }
    println!("{} events, {} invocations", plan.events, fired.len());
    Ok(())
}
