//! Core infrastructure.
//!
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Store error taxonomy

pub mod config;
pub mod error;
