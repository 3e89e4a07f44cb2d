//! Configuration store abstraction.
//!
//! A configuration store answers three questions about a path: what values
//! live under it ([`ConfigStore::list`]), what value it holds
//! ([`ConfigStore::get`]), and when it next changes ([`ConfigStore::watch`]).
//! Reads never fail visibly; a store that cannot be reached reads as empty.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                consumer loops                │
//! │   list/get (reader)      watch (watcher)     │
//! └──────────────────────────────────────────────┘
//!                       │
//! ┌──────────────────────────────────────────────┐
//! │        ConfigStore  (EtcdStore<C>)           │
//! │   watch cursor │ retry policy │ decoding     │
//! └──────────────────────────────────────────────┘
//!                       │
//! ┌──────────────────────────────────────────────┐
//! │        StoreClient  (HttpEtcdClient)         │
//! │        etcd v2 keys API over HTTP            │
//! └──────────────────────────────────────────────┘
//! ```

pub mod decode;
pub mod etcd;

use crate::core::config::StoreSettings;
use crate::core::error::{StoreError, StoreResult};
use reqwest::Url;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;

pub use decode::{decode_endpoints, expand_value, EndpointSet};
pub use etcd::{EtcdStore, HttpEtcdClient};

/// Boxed future returned by [`ConfigStore`] operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a watch call ended.
///
/// Purely informational: the contract of a watch is "return when it is
/// worth re-reading", and callers are free to ignore this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The store reported a change at `index`.
    Changed { index: u64 },
    /// The requested index had been cleared; the cursor moved to `wait_index`.
    IndexCleared { wait_index: u64 },
    /// The watch failed and the backoff interval was slept.
    BackedOff,
    /// Shutdown was signalled before the watch finished.
    Cancelled,
}

impl WatchOutcome {
    /// Whether the store positively reported a change.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Read-only configuration store.
pub trait ConfigStore: Send + Sync {
    /// Backend name (e.g. "etcd").
    fn name(&self) -> &'static str;

    /// Values under `path`, in store order. Empty on error.
    fn list<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Vec<String>>;

    /// Value at `path`. Empty on error.
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, String>;

    /// Block until something at or beneath `path` changes, or a failure
    /// has been backed off.
    fn watch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, WatchOutcome>;
}

/// Open a store from a URI such as `etcd://127.0.0.1:2379`.
pub fn open_store(
    uri: &str,
    settings: &StoreSettings,
    shutdown: Option<watch::Receiver<bool>>,
) -> StoreResult<Arc<dyn ConfigStore>> {
    let parsed = Url::parse(uri).map_err(|e| StoreError::InvalidUri(format!("{}: {}", uri, e)))?;

    match parsed.scheme() {
        "etcd" => {
            let client = HttpEtcdClient::from_uri(&parsed, settings);
            tracing::info!(endpoints = ?client.endpoints(), "opening etcd store");
            let mut store = EtcdStore::with_settings(client, settings);
            if let Some(shutdown) = shutdown {
                store = store.with_shutdown(shutdown);
            }
            Ok(Arc::new(store))
        }
        scheme => Err(StoreError::InvalidUri(format!(
            "{}: unsupported store scheme '{}'",
            uri, scheme
        ))),
    }
}
