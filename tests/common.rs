//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use confstore::error::{StoreError, StoreResult};
use confstore::store::etcd::{codes, EtcdError, Node, StoreClient, StoreFuture, StoreResponse};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Store client that replays scripted replies in order.
///
/// Fetches with nothing scripted fail with a transport error. Long-polls with
/// nothing scripted block forever, like an idle etcd watch.
#[derive(Default)]
pub struct ScriptedClient {
    subtree: Mutex<VecDeque<StoreResult<StoreResponse>>>,
    leaf: Mutex<VecDeque<StoreResult<StoreResponse>>>,
    polls: Mutex<VecDeque<StoreResult<StoreResponse>>>,
    poll_indexes: Mutex<Vec<u64>>,
    fetched_paths: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_subtree(&self, reply: StoreResult<StoreResponse>) -> &Self {
        self.subtree.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_leaf(&self, reply: StoreResult<StoreResponse>) -> &Self {
        self.leaf.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_poll(&self, reply: StoreResult<StoreResponse>) -> &Self {
        self.polls.lock().unwrap().push_back(reply);
        self
    }

    /// Wait indexes passed to each long-poll, in call order.
    pub fn poll_indexes(&self) -> Vec<u64> {
        self.poll_indexes.lock().unwrap().clone()
    }

    /// Paths passed to fetches, in call order.
    pub fn fetched_paths(&self) -> Vec<String> {
        self.fetched_paths.lock().unwrap().clone()
    }

    fn next_fetch(
        &self,
        queue: &Mutex<VecDeque<StoreResult<StoreResponse>>>,
        path: &str,
    ) -> StoreResult<StoreResponse> {
        self.fetched_paths.lock().unwrap().push(path.to_string());
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::transport("nothing scripted")))
    }
}

impl StoreClient for ScriptedClient {
    fn fetch_subtree<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse> {
        let reply = self.next_fetch(&self.subtree, path);
        Box::pin(async move { reply })
    }

    fn fetch_leaf<'a>(&'a self, path: &'a str) -> StoreFuture<'a, StoreResponse> {
        let reply = self.next_fetch(&self.leaf, path);
        Box::pin(async move { reply })
    }

    fn long_poll<'a>(&'a self, _path: &'a str, wait_index: u64) -> StoreFuture<'a, StoreResponse> {
        self.poll_indexes.lock().unwrap().push(wait_index);
        let reply = self.polls.lock().unwrap().pop_front();
        Box::pin(async move {
            match reply {
                Some(reply) => reply,
                None => std::future::pending().await,
            }
        })
    }
}

/// A "get" response for a leaf holding `value`.
pub fn leaf(key: &str, value: &str) -> StoreResult<StoreResponse> {
    Ok(StoreResponse::get(Node::leaf(key, value)))
}

/// A "get" response for a directory with leaf children.
pub fn dir(key: &str, values: &[&str]) -> StoreResult<StoreResponse> {
    let nodes = values
        .iter()
        .enumerate()
        .map(|(i, v)| Node::leaf(format!("{}/{}", key, i), *v))
        .collect();
    Ok(StoreResponse::get(Node::dir(key, nodes)))
}

/// A response with no node at all.
pub fn absent() -> StoreResult<StoreResponse> {
    Ok(StoreResponse::default())
}

/// A watch event reported at `index`.
pub fn change(key: &str, index: u64) -> StoreResult<StoreResponse> {
    Ok(StoreResponse::event("set", Node::leaf(key, "changed"), index))
}

/// A structured etcd error with the given code.
pub fn etcd_error(code: u32) -> StoreResult<StoreResponse> {
    Err(StoreError::Remote(EtcdError::new(code, "scripted").with_index(1000)))
}

/// The structured "event index cleared" error.
pub fn index_cleared() -> StoreResult<StoreResponse> {
    etcd_error(codes::EVENT_INDEX_CLEARED)
}

/// An unstructured transport failure.
pub fn transport_error() -> StoreResult<StoreResponse> {
    Err(StoreError::transport("connection reset by peer"))
}

/// Write `content` to a temporary config file.
pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}
