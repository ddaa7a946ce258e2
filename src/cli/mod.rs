//! CLI interface for market-scanner
//!
//! Provides subcommands for:
//! - `run`: Scan on a schedule (the default)
//! - `once`: Scan a single time and exit
//! - `config`: Show the effective configuration

mod run;

pub use run::{OnceArgs, RunArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "market-scanner")]
#[command(about = "Ranks Polymarket reward markets by reward per unit of volatility")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scan every `schedule.interval_secs` seconds
    Run(RunArgs),
    /// Scan once and exit
    Once(OnceArgs),
    /// Show configuration
    Config,
}

impl Cli {
    /// The subcommand, `run` when none was given
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}
