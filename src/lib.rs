//! confstore - read-only configuration store adapter over etcd.
//!
//! confstore exposes the etcd v2 keys API through a small configuration store
//! interface: list the values under a path, get the value at a path, and
//! block until a path changes. Values that encode a named set of endpoints
//! (`{"kind": ..., "endpoints": [...]}`) are expanded into their addresses
//! when listed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Consumers / CLI                           │
//! │        reader loop: list / get       watcher loop: watch        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      ConfigStore adapter                        │
//! │   watch cursor │ index-cleared recovery │ backoff │ decoding    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Store client                            │
//! │         etcd v2 keys API over HTTP │ endpoint failover          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::error`] - Store error taxonomy
//! - [`store`] - [`store::ConfigStore`] trait and store factory
//! - [`store::decode`] - Endpoint set decoding
//! - [`store::etcd`] - etcd client, response types and adapter
//! - [`cli`] - CLI command implementations
//!
//! # Key Invariants
//!
//! - The watch cursor belongs to one adapter value and only Watch moves it
//! - List and Get never surface errors; failures read as empty values
//! - Watch never spins: every failure other than a cleared index sleeps

// Core infrastructure
pub mod core;

// Store abstraction and backends
pub mod store;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::core::{config, error};
pub use store::{open_store, ConfigStore, EtcdStore, WatchOutcome};
