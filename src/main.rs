//! confstore - unified CLI entrypoint.
//!
//! Usage:
//!   confstore list /services/web [--uri etcd://127.0.0.1:2379]
//!   confstore get /config/feature-flag
//!   confstore watch /services/web [--once]
//!   confstore config validate --config config/confstore.toml

use anyhow::Result;
use clap::Parser;
use confstore::cli::commands::{
    init_tracing, load_config, run_config, run_get, run_list, run_watch,
};
use confstore::cli::{Cli, Commands, DEFAULT_CONFIG_PATH};
use confstore::core::config::{Config, ConfigOverrides};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let overrides = ConfigOverrides {
        uri: cli.uri,
        log_level: cli.log_level,
    };

    match cli.command {
        Commands::Config(args) => run_config(args, &config_path, &overrides),
        Commands::List(args) => run_list(args, &setup(&config_path, &overrides)?).await,
        Commands::Get(args) => run_get(args, &setup(&config_path, &overrides)?).await,
        Commands::Watch(args) => run_watch(args, &setup(&config_path, &overrides)?).await,
    }
}

/// Load configuration and install the log sink.
fn setup(config_path: &Path, overrides: &ConfigOverrides) -> Result<Config> {
    let config = load_config(config_path, overrides)?;
    init_tracing(&config.telemetry.log_level);
    Ok(config)
}
