//! CLI command implementations.

mod config;
mod read;
mod watch;

pub use config::{run_config, ConfigArgs, ConfigCommand};
pub use read::{print_values, run_get, run_list, write_values, GetArgs, ListArgs, OutputFormat};
pub use watch::{run_watch, WatchArgs};

use crate::core::config::{Config, ConfigOverrides};
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration (or defaults when the file is absent) and apply CLI
/// overrides.
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = Config::load_or_default(path)
        .with_context(|| format!("failed to load config from {:?}", path))?;
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}

/// Initialize tracing subscriber if the telemetry feature is enabled.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so that
/// command output on stdout stays machine readable.
#[cfg(feature = "telemetry")]
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "telemetry"))]
pub fn init_tracing(_log_level: &str) {}
