//! Error types for store access.
//!
//! The adapter absorbs every failure at its boundary, but the layers below it
//! report them precisely so the watch policy can tell a store-reported error
//! (which carries an etcd error code) from an unstructured one.

use crate::store::etcd::errors::EtcdError;
use thiserror::Error;

/// Errors raised while talking to a configuration store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with its structured error body.
    #[error("{0}")]
    Remote(EtcdError),

    /// Connection, timeout, or other failure below the store protocol.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The store URI is malformed or names an unsupported backend.
    #[error("invalid store uri: {0}")]
    InvalidUri(String),
}

impl StoreError {
    /// Create a Transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a Decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether the error came back in the store's structured error shape.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// The store error code, if the error is structured.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Remote(err) => Some(err.error_code),
            _ => None,
        }
    }

    /// Check if the store reported that the requested watch index has
    /// fallen out of its retained event history.
    pub fn is_index_cleared(&self) -> bool {
        matches!(self, Self::Remote(err) if err.is_index_cleared())
    }
}

impl From<EtcdError> for StoreError {
    fn from(err: EtcdError) -> Self {
        Self::Remote(err)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Result type using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::etcd::errors::codes;

    #[test]
    fn structured_errors_expose_code() {
        let err = StoreError::from(EtcdError::new(codes::KEY_NOT_FOUND, "Key not found"));
        assert!(err.is_structured());
        assert_eq!(err.code(), Some(100));
        assert!(!err.is_index_cleared());
    }

    #[test]
    fn index_cleared_is_recognised() {
        let err = StoreError::from(EtcdError::new(
            codes::EVENT_INDEX_CLEARED,
            "The event in requested index is outdated and cleared",
        ));
        assert!(err.is_index_cleared());
    }

    #[test]
    fn unstructured_errors_have_no_code() {
        let err = StoreError::transport("connection refused");
        assert!(!err.is_structured());
        assert_eq!(err.code(), None);
        assert!(!err.is_index_cleared());
        assert!(err.to_string().contains("connection refused"));
    }
}
