//! etcd-backed configuration store.
//!
//! [`EtcdStore`] turns store responses into plain values and owns the watch
//! cursor. List and Get degrade to empty values on any error; Watch never
//! fails and only advances the cursor or sleeps.
//!
//! # Watch policy
//!
//! ```text
//! long-poll(path, cursor)
//!   ├── change at index X        → cursor = X + 1, return
//!   ├── 401 event index cleared  → cursor += 1, return (no sleep)
//!   ├── other etcd error code    → log, sleep backoff, return
//!   └── transport / decode error → log, sleep backoff, return
//! ```

use crate::core::config::StoreSettings;
use crate::core::error::StoreResult;
use crate::store::decode::expand_value;
use crate::store::etcd::client::StoreClient;
use crate::store::{BoxFuture, ConfigStore, WatchOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Configuration store over an etcd keys API client.
pub struct EtcdStore<C> {
    client: C,
    /// Lowest change index the next watch asks for. 0 means "from now".
    wait_index: AtomicU64,
    /// Serializes watch calls so cursor updates never interleave.
    watch_gate: Mutex<()>,
    error_backoff: Duration,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<C: StoreClient> EtcdStore<C> {
    /// Create a store over `client` with the default backoff.
    pub fn new(client: C) -> Self {
        Self {
            client,
            wait_index: AtomicU64::new(0),
            watch_gate: Mutex::new(()),
            error_backoff: StoreSettings::default().error_backoff,
            shutdown: None,
        }
    }

    /// Create a store using the backoff from `settings`.
    pub fn with_settings(client: C, settings: &StoreSettings) -> Self {
        Self::new(client).with_error_backoff(settings.error_backoff)
    }

    /// Set the sleep applied after a failed watch.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Abandon in-flight watches once `shutdown` turns true.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Start watching from a known index instead of "now".
    pub fn with_wait_index(self, wait_index: u64) -> Self {
        self.wait_index.store(wait_index, Ordering::Release);
        self
    }

    /// Current watch cursor.
    pub fn wait_index(&self) -> u64 {
        self.wait_index.load(Ordering::Acquire)
    }

    /// List the values under `path`, reporting store errors.
    ///
    /// Children are returned in store order. A childless node expands its
    /// value through the endpoint set decoder.
    pub async fn try_list(&self, path: &str) -> StoreResult<Vec<String>> {
        let resp = self.client.fetch_subtree(path).await?;
        let Some(node) = resp.node else {
            return Ok(Vec::new());
        };

        if node.nodes.is_empty() {
            return Ok(expand_value(node.value_str()));
        }

        Ok(node
            .nodes
            .into_iter()
            .map(|child| child.value.unwrap_or_default())
            .collect())
    }

    /// Get the raw value at `path`, reporting store errors.
    pub async fn try_get(&self, path: &str) -> StoreResult<String> {
        let resp = self.client.fetch_leaf(path).await?;
        Ok(resp
            .node
            .and_then(|node| node.value)
            .unwrap_or_default())
    }

    /// List the values under `path`; empty on any error.
    pub async fn list(&self, path: &str) -> Vec<String> {
        match self.try_list(path).await {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "etcd list failed");
                Vec::new()
            }
        }
    }

    /// Get the value at `path`; empty on any error.
    pub async fn get(&self, path: &str) -> String {
        match self.try_get(path).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "etcd get failed");
                String::new()
            }
        }
    }

    /// Block until something at or beneath `path` changes.
    ///
    /// Callers loop on this and re-read with [`list`](Self::list) or
    /// [`get`](Self::get) after each return.
    pub async fn watch(&self, path: &str) -> WatchOutcome {
        let _gate = self.watch_gate.lock().await;
        let wait_index = self.wait_index.load(Ordering::Acquire);

        let result = match self.shutdown.clone() {
            Some(mut shutdown) => {
                if *shutdown.borrow() {
                    return WatchOutcome::Cancelled;
                }
                tokio::select! {
                    result = self.client.long_poll(path, wait_index) => result,
                    _ = shutdown_signalled(&mut shutdown) => {
                        tracing::debug!(path = %path, "etcd watch cancelled");
                        return WatchOutcome::Cancelled;
                    }
                }
            }
            None => self.client.long_poll(path, wait_index).await,
        };

        match result {
            Ok(resp) => {
                let index = resp.change_index();
                let next = index.saturating_add(1);
                if next < wait_index {
                    tracing::warn!(
                        path = %path,
                        wait_index,
                        index,
                        "etcd index moved backwards"
                    );
                }
                self.wait_index.store(next, Ordering::Release);
                tracing::debug!(path = %path, index, action = %resp.action, "etcd change observed");
                WatchOutcome::Changed { index }
            }
            Err(e) if e.is_index_cleared() => {
                // Racy: nudging the cursor by one walks it back into the
                // store's retained history over successive calls.
                let next = wait_index.saturating_add(1);
                self.wait_index.store(next, Ordering::Release);
                tracing::debug!(path = %path, wait_index = next, "etcd watch index cleared");
                WatchOutcome::IndexCleared { wait_index: next }
            }
            Err(e) => {
                match e.code() {
                    Some(code) => {
                        tracing::warn!(path = %path, code, error = %e, "etcd watch failed")
                    }
                    None => tracing::warn!(path = %path, error = %e, "etcd watch failed"),
                }
                self.backoff().await
            }
        }
    }

    async fn backoff(&self) -> WatchOutcome {
        match self.shutdown.clone() {
            Some(mut shutdown) => {
                tokio::select! {
                    _ = tokio::time::sleep(self.error_backoff) => WatchOutcome::BackedOff,
                    _ = shutdown_signalled(&mut shutdown) => WatchOutcome::Cancelled,
                }
            }
            None => {
                tokio::time::sleep(self.error_backoff).await;
                WatchOutcome::BackedOff
            }
        }
    }
}

impl<C: StoreClient> ConfigStore for EtcdStore<C> {
    fn name(&self) -> &'static str {
        "etcd"
    }

    fn list<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Vec<String>> {
        Box::pin(EtcdStore::list(self, path))
    }

    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, String> {
        Box::pin(EtcdStore::get(self, path))
    }

    fn watch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, WatchOutcome> {
        Box::pin(EtcdStore::watch(self, path))
    }
}

/// Resolves once the shutdown flag is true. A dropped sender can no longer
/// signal, so the future then stays pending.
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;
    use crate::store::etcd::client::StoreFuture;
    use crate::store::etcd::response::{Node, StoreResponse};

    /// Client whose every call fails the same way.
    struct FailingClient;

    impl StoreClient for FailingClient {
        fn fetch_subtree<'a>(&'a self, _path: &'a str) -> StoreFuture<'a, StoreResponse> {
            Box::pin(async { Err(StoreError::transport("connection refused")) })
        }

        fn fetch_leaf<'a>(&'a self, _path: &'a str) -> StoreFuture<'a, StoreResponse> {
            Box::pin(async { Err(StoreError::transport("connection refused")) })
        }

        fn long_poll<'a>(&'a self, _path: &'a str, _wait_index: u64) -> StoreFuture<'a, StoreResponse> {
            Box::pin(async { Err(StoreError::transport("connection refused")) })
        }
    }

    /// Client that serves one fixed node.
    struct FixedClient(Node);

    impl StoreClient for FixedClient {
        fn fetch_subtree<'a>(&'a self, _path: &'a str) -> StoreFuture<'a, StoreResponse> {
            let node = self.0.clone();
            Box::pin(async move { Ok(StoreResponse::get(node)) })
        }

        fn fetch_leaf<'a>(&'a self, _path: &'a str) -> StoreFuture<'a, StoreResponse> {
            let node = self.0.clone();
            Box::pin(async move { Ok(StoreResponse::get(node)) })
        }

        fn long_poll<'a>(&'a self, _path: &'a str, _wait_index: u64) -> StoreFuture<'a, StoreResponse> {
            let node = self.0.clone();
            Box::pin(async move { Ok(StoreResponse::event("set", node, 0)) })
        }
    }

    #[tokio::test]
    async fn errors_degrade_to_empty() {
        let store = EtcdStore::new(FailingClient);
        assert!(store.list("/a").await.is_empty());
        assert_eq!(store.get("/a").await, "");
        assert!(store.try_list("/a").await.is_err());
        assert!(store.try_get("/a").await.is_err());
    }

    #[tokio::test]
    async fn get_does_not_decode() {
        let raw = r#"{"kind":"Endpoints","endpoints":["10.0.0.1:80"]}"#;
        let store = EtcdStore::new(FixedClient(Node::leaf("/svc", raw)));
        assert_eq!(store.get("/svc").await, raw);
        assert_eq!(store.list("/svc").await, vec!["10.0.0.1:80"]);
    }

    #[tokio::test]
    async fn change_index_falls_back_to_modified_index() {
        let node = Node::leaf("/svc", "v").with_modified_index(41);
        let store = EtcdStore::new(FixedClient(node));
        assert_eq!(store.watch("/svc").await, WatchOutcome::Changed { index: 41 });
        assert_eq!(store.wait_index(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn signalled_shutdown_skips_long_poll() {
        let (tx, rx) = watch::channel(true);
        let store = EtcdStore::new(FailingClient).with_shutdown(rx);
        assert_eq!(store.watch("/a").await, WatchOutcome::Cancelled);
        assert_eq!(store.wait_index(), 0);
        drop(tx);
    }
}
