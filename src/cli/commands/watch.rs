//! Watch command implementation.

use super::read::{write_values, OutputFormat};
use crate::core::config::Config;
use crate::store::{open_store, ConfigStore, WatchOutcome};
use anyhow::Result;
use clap::Args;
use std::io::Write;
use tokio::sync::watch;

/// Watch a path and print its values after every change.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Store path.
    pub path: String,

    /// Exit after the first observed change.
    #[arg(long)]
    pub once: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Run the watch command until Ctrl-C (or the first change with `--once`).
pub async fn run_watch(args: WatchArgs, config: &Config) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let store = open_store(&config.store.uri, &config.store_settings(), Some(shutdown_rx))?;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("shutdown signal received (SIGINT)");
            let _ = shutdown_tx.send(true);
        }
    });

    watch_loop(store.as_ref(), &args, &mut std::io::stdout()).await
}

/// Print the listing, then re-read after every watch return.
///
/// A reported change always prints the fresh listing. Index-cleared and
/// backed-off returns re-read too, but print only if the listing moved.
async fn watch_loop<W: Write>(store: &dyn ConfigStore, args: &WatchArgs, out: &mut W) -> Result<()> {
    let mut current = store.list(&args.path).await;
    write_values(out, &current, args.format)?;

    loop {
        let outcome = store.watch(&args.path).await;
        if outcome == WatchOutcome::Cancelled {
            tracing::info!(path = %args.path, "watch stopped");
            return Ok(());
        }

        let values = store.list(&args.path).await;
        if outcome.is_change() || values != current {
            write_values(out, &values, args.format)?;
            current = values;
        }

        if args.once && outcome.is_change() {
            return Ok(());
        }
    }
}
