//! etcd v2 error bodies.
//!
//! A failed v2 keys request returns a JSON body of the form
//! `{"errorCode":100,"message":"Key not found","cause":"/foo","index":12}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// etcd v2 error codes recognised by this crate.
pub mod codes {
    pub const KEY_NOT_FOUND: u32 = 100;
    pub const TEST_FAILED: u32 = 101;
    pub const NOT_FILE: u32 = 102;
    pub const NOT_DIR: u32 = 104;
    pub const NODE_EXIST: u32 = 105;
    pub const ROOT_READ_ONLY: u32 = 107;
    pub const DIR_NOT_EMPTY: u32 = 108;
    pub const UNAUTHORIZED: u32 = 110;

    pub const PREV_VALUE_REQUIRED: u32 = 201;
    pub const TTL_NAN: u32 = 202;
    pub const INDEX_NAN: u32 = 203;
    pub const INVALID_FIELD: u32 = 209;
    pub const INVALID_FORM: u32 = 210;

    pub const RAFT_INTERNAL: u32 = 300;
    pub const LEADER_ELECT: u32 = 301;

    pub const WATCHER_CLEARED: u32 = 400;
    /// The requested watch index is older than the retained event history.
    pub const EVENT_INDEX_CLEARED: u32 = 401;
}

/// Structured error returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdError {
    /// Numeric etcd error code.
    pub error_code: u32,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// The key or value that caused the error.
    #[serde(default)]
    pub cause: String,
    /// Store index at the time of the error.
    #[serde(default)]
    pub index: u64,
}

impl EtcdError {
    /// Create an error with the given code and message.
    pub fn new(error_code: u32, message: impl Into<String>) -> Self {
        Self {
            error_code,
            message: message.into(),
            cause: String::new(),
            index: 0,
        }
    }

    /// Set the cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = cause.into();
        self
    }

    /// Set the store index.
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }

    /// Check if the requested watch index has been cleared from history.
    pub fn is_index_cleared(&self) -> bool {
        self.error_code == codes::EVENT_INDEX_CLEARED
    }

    /// Check if the key does not exist.
    pub fn is_key_not_found(&self) -> bool {
        self.error_code == codes::KEY_NOT_FOUND
    }
}

impl fmt::Display for EtcdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}) [{}]",
            self.error_code, self.message, self.cause, self.index
        )
    }
}
