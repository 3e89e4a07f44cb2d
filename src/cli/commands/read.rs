//! List and get command implementations.

use crate::core::config::Config;
use crate::store::open_store;
use anyhow::Result;
use clap::{Args, ValueEnum};
use std::io::Write;

/// Output format for listed values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One value per line.
    #[default]
    Text,
    /// A JSON array.
    Json,
}

/// List the values under a path.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Store path (e.g. /services/web).
    pub path: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Print the value at a path.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Store path.
    pub path: String,
}

/// Run the list command.
pub async fn run_list(args: ListArgs, config: &Config) -> Result<()> {
    let store = open_store(&config.store.uri, &config.store_settings(), None)?;
    let values = store.list(&args.path).await;
    print_values(&values, args.format)
}

/// Run the get command.
pub async fn run_get(args: GetArgs, config: &Config) -> Result<()> {
    let store = open_store(&config.store.uri, &config.store_settings(), None)?;
    println!("{}", store.get(&args.path).await);
    Ok(())
}

/// Write listed values to stdout.
pub fn print_values(values: &[String], format: OutputFormat) -> Result<()> {
    write_values(&mut std::io::stdout(), values, format)
}

/// Write listed values to `out`.
pub fn write_values<W: Write>(out: &mut W, values: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for value in values {
                writeln!(out, "{}", value)?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(values)?)?,
    }
    out.flush()?;
    Ok(())
}
