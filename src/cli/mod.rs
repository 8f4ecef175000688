//! Command-line interface definitions.

pub mod check;
pub mod migrate;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

/// Storebatch - chunked snapshot batch job for store aggregates.
#[derive(Parser, Debug)]
#[command(name = "storebatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one backup job over stores matching an address prefix
    Run(RunArgs),

    /// Apply pending database migrations
    Migrate(MigrateArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `storebatch check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "storebatch.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address prefix to filter stores by (prefix match, not substring)
    #[arg(short, long)]
    pub address: String,

    /// Snapshots per atomic persist
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Path to configuration file (defaults apply when the default path is absent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the database location
    #[arg(long)]
    pub database_url: Option<String>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Print the job outcome as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `migrate` subcommand.
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the database location
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Load configuration for a command.
///
/// An explicitly passed path must load; with no path given, a missing
/// file at the default location falls back to built-in defaults.
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let default = PathBuf::from("storebatch.toml");
            if default.exists() {
                Config::load(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}
