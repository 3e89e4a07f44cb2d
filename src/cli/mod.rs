//! Command-line interface.
//!
//! The CLI is a thin consumer of [`crate::store::ConfigStore`]: point reads
//! for `list` and `get`, and a watch loop that re-reads after every change.

pub mod commands;

use clap::{Parser, Subcommand};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/confstore.toml";

/// confstore - read and watch configuration held in etcd.
#[derive(Parser, Debug)]
#[command(name = "confstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Store URI (e.g. etcd://127.0.0.1:2379), overrides store.uri.
    #[arg(long, global = true)]
    pub uri: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the values under a path.
    List(commands::ListArgs),
    /// Print the value at a path.
    Get(commands::GetArgs),
    /// Watch a path and print its values after every change.
    Watch(commands::WatchArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
}
