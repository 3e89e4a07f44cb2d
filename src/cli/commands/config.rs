//! Config command implementation.

use super::load_config;
use crate::core::config::ConfigOverrides;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

/// Configuration operations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
    /// Print the effective configuration with defaults and overrides.
    Show {
        /// Output format (toml, json).
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

/// Run the config command.
pub fn run_config(args: ConfigArgs, path: &Path, overrides: &ConfigOverrides) -> Result<()> {
    match args.command {
        ConfigCommand::Validate => {
            load_config(path, overrides)?;
            println!("✓ Configuration is valid: {}", path.display());
            Ok(())
        }
        ConfigCommand::Show { format } => {
            let config = load_config(path, overrides)?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&config)?),
                "toml" => print!("{}", toml::to_string_pretty(&config)?),
                other => anyhow::bail!("unknown format '{}', expected toml or json", other),
            }
            Ok(())
        }
    }
}
