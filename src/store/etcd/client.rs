//! Store client for the etcd v2 keys API.
//!
//! [`StoreClient`] is the capability set the adapter consumes: a recursive
//! fetch, a single-node fetch, and a recursive long-poll from a watch index.
//! [`HttpEtcdClient`] implements it over HTTP with `reqwest`.

use crate::core::config::StoreSettings;
use crate::core::error::{StoreError, StoreResult};
use crate::store::etcd::errors::EtcdError;
use crate::store::etcd::response::StoreResponse;
use reqwest::Url;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Endpoint used when the store URI names no host.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:2379";

/// Header carrying the store's current index.
const ETCD_INDEX_HEADER: &str = "X-Etcd-Index";

/// Boxed future returned by [`StoreClient`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Remote operations the configuration store adapter needs.
pub trait StoreClient: Send + Sync {
    /// Fetch `path` and its children.
    fn fetch_subtree<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse>;

    /// Fetch the single node at `path`.
    fn fetch_leaf<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse>;

    /// Block until a change at or beneath `path` with index >= `wait_index`.
    ///
    /// A `wait_index` of 0 waits for the next change after the request.
    fn long_poll<'a>(&'a self, path: &'a str, wait_index: u64) -> StoreFuture<'a, StoreResponse>;
}

impl<C: StoreClient + ?Sized> StoreClient for Arc<C> {
    fn fetch_subtree<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse> {
        (**self).fetch_subtree(path)
    }

    fn fetch_leaf<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse> {
        (**self).fetch_leaf(path)
    }

    fn long_poll<'a>(&'a self, path: &'a str, wait_index: u64) -> StoreFuture<'a, StoreResponse> {
        (**self).long_poll(path, wait_index)
    }
}

/// HTTP client for one etcd cluster.
#[derive(Debug, Clone)]
pub struct HttpEtcdClient {
    endpoints: Vec<String>,
    http: reqwest::Client,
    request_timeout: Duration,
    poll_timeout: Option<Duration>,
}

impl HttpEtcdClient {
    /// Create a client for the given base URLs (e.g. "http://10.0.0.1:2379").
    ///
    /// An empty list falls back to [`DEFAULT_ENDPOINT`].
    pub fn new(endpoints: Vec<String>, settings: &StoreSettings) -> Self {
        let endpoints = if endpoints.is_empty() {
            vec![DEFAULT_ENDPOINT.to_string()]
        } else {
            endpoints
        };
        Self {
            endpoints,
            http: reqwest::Client::new(),
            request_timeout: settings.request_timeout,
            poll_timeout: settings.poll_timeout,
        }
    }

    /// Create a client bound to the host and port of a store URI.
    pub fn from_uri(uri: &Url, settings: &StoreSettings) -> Self {
        Self::new(endpoints_from_uri(uri), settings)
    }

    /// Base URLs, in failover order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn request(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> StoreResult<StoreResponse> {
        let mut last_err = None;

        for base in &self.endpoints {
            let url = keys_url(base, path)?;
            let mut req = self.http.get(url.clone()).query(query);
            if let Some(timeout) = timeout {
                req = req.timeout(timeout);
            }

            match req.send().await {
                Ok(resp) => return decode_response(&url, resp).await,
                Err(e) if e.is_connect() => {
                    tracing::debug!(endpoint = %base, error = %e, "etcd endpoint unreachable");
                    last_err = Some(StoreError::from(e));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err.unwrap_or_else(|| StoreError::transport("no etcd endpoints configured")))
    }
}

impl StoreClient for HttpEtcdClient {
    fn fetch_subtree<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse> {
        Box::pin(async move {
            let query = [
                ("recursive", "true".to_string()),
                ("sorted", "false".to_string()),
            ];
            self.request(path, &query, Some(self.request_timeout)).await
        })
    }

    fn fetch_leaf<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse> {
        Box::pin(async move {
            let query = [
                ("recursive", "false".to_string()),
                ("sorted", "false".to_string()),
            ];
            self.request(path, &query, Some(self.request_timeout)).await
        })
    }

    fn long_poll<'a>(&'a self, path: &'a str, wait_index: u64) -> StoreFuture<'a, StoreResponse> {
        Box::pin(async move {
            let query = watch_query(wait_index);
            self.request(path, &query, self.poll_timeout).await
        })
    }
}

/// Derive base URLs from a store URI such as `etcd://10.0.0.1:2379`.
pub fn endpoints_from_uri(uri: &Url) -> Vec<String> {
    match uri.host_str() {
        Some(host) if !host.is_empty() => match uri.port() {
            Some(port) => vec![format!("http://{}:{}", host, port)],
            None => vec![format!("http://{}", host)],
        },
        _ => Vec::new(),
    }
}

/// Build `{base}/v2/keys{path}` with every path segment percent-encoded.
pub fn keys_url(base: &str, path: &str) -> StoreResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| StoreError::InvalidUri(format!("{}: {}", base, e)))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| StoreError::InvalidUri(format!("{}: cannot be a base", base)))?;
        segments.pop_if_empty().push("v2").push("keys");
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            segments.push(segment);
        }
    }
    Ok(url)
}

fn watch_query(wait_index: u64) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("wait", "true".to_string()),
        ("recursive", "true".to_string()),
    ];
    if wait_index > 0 {
        query.push(("waitIndex", wait_index.to_string()));
    }
    query
}

async fn decode_response(url: &Url, resp: reqwest::Response) -> StoreResult<StoreResponse> {
    let status = resp.status();
    let etcd_index = resp
        .headers()
        .get(ETCD_INDEX_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let body = resp.bytes().await?;

    if status.is_success() {
        let mut response: StoreResponse = serde_json::from_slice(&body)
            .map_err(|e| StoreError::decode(format!("invalid response from {}: {}", url, e)))?;
        response.etcd_index = etcd_index;
        return Ok(response);
    }

    match serde_json::from_slice::<EtcdError>(&body) {
        Ok(err) => Err(StoreError::Remote(err)),
        Err(_) => Err(StoreError::transport(format!(
            "unexpected status {} from {}",
            status, url
        ))),
    }
}
