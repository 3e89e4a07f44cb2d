//! etcd v2 keys API backend.
//!
//! # Modules
//!
//! - [`client`] - [`StoreClient`] capability trait and the HTTP client
//! - [`response`] - Node and response bodies
//! - [`errors`] - Structured error bodies and error codes
//! - [`adapter`] - [`EtcdStore`], the configuration store over a client

pub mod adapter;
pub mod client;
pub mod errors;
pub mod response;

pub use adapter::EtcdStore;
pub use client::{HttpEtcdClient, StoreClient, StoreFuture, DEFAULT_ENDPOINT};
pub use errors::{codes, EtcdError};
pub use response::{Node, StoreResponse};
