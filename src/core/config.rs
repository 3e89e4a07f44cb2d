//! Configuration parsing and validation.
//!
//! Configuration is loaded from a TOML file with CLI overrides. Every section
//! is optional; a missing file section falls back to its defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store connection configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Watch loop policy.
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Store connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store URI, e.g. "etcd://127.0.0.1:2379".
    #[serde(default = "default_store_uri")]
    pub uri: String,

    /// Timeout for List/Get requests in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Client-side long-poll timeout in milliseconds. 0 leaves the
    /// long-poll bounded only by the store.
    #[serde(default)]
    pub poll_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: default_store_uri(),
            request_timeout_ms: default_request_timeout_ms(),
            poll_timeout_ms: 0,
        }
    }
}

/// Watch loop policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Sleep after a failed watch (other than an expired index).
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            error_backoff_ms: default_error_backoff_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Runtime settings handed to the store layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Timeout for List/Get requests.
    pub request_timeout: Duration,
    /// Optional client-side long-poll timeout.
    pub poll_timeout: Option<Duration>,
    /// Watch backoff after errors.
    pub error_backoff: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(default_request_timeout_ms()),
            poll_timeout: None,
            error_backoff: Duration::from_millis(default_error_backoff_ms()),
        }
    }
}

// Default value functions

fn default_store_uri() -> String {
    "etcd://127.0.0.1:2379".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_error_backoff_ms() -> u64 {
    1_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = Self::parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it.
    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse_toml(&content)
    }

    /// Parse a TOML string without validating it.
    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "failed to parse config")
    }

    /// Parse the file if it exists, otherwise start from defaults.
    ///
    /// Nothing is validated here: callers apply overrides first and then
    /// call [`Config::validate`].
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::parse_file(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply CLI overrides to the configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref uri) = overrides.uri {
            self.store.uri = uri.clone();
        }
        if let Some(ref log_level) = overrides.log_level {
            self.telemetry.log_level = log_level.clone();
        }
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.validate_store()?;
        self.validate_watch()?;
        self.validate_telemetry()?;
        Ok(())
    }

    /// Settings for the store layer.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            request_timeout: Duration::from_millis(self.store.request_timeout_ms),
            poll_timeout: match self.store.poll_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            error_backoff: Duration::from_millis(self.watch.error_backoff_ms),
        }
    }

    fn validate_store(&self) -> Result<()> {
        if self.store.uri.trim().is_empty() {
            anyhow::bail!("store.uri must not be empty");
        }
        if !self.store.uri.contains("://") {
            anyhow::bail!(
                "store.uri must have the form scheme://host:port, got: {}",
                self.store.uri
            );
        }
        if self.store.request_timeout_ms == 0 {
            anyhow::bail!("store.request_timeout_ms must be > 0");
        }
        Ok(())
    }

    fn validate_watch(&self) -> Result<()> {
        // A zero backoff turns a persistent store error into a busy loop.
        if self.watch.error_backoff_ms == 0 {
            anyhow::bail!("watch.error_backoff_ms must be > 0");
        }
        Ok(())
    }

    fn validate_telemetry(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "telemetry.log_level must be one of {:?}, got: {}",
                valid_levels,
                self.telemetry.log_level
            );
        }
        Ok(())
    }
}

/// CLI override options that can be applied to configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override store URI.
    pub uri: Option<String>,
    /// Override log level.
    pub log_level: Option<String>,
}
