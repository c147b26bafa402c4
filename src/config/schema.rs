//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the health-check daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyscheckConfig {
    /// URLs to probe, in the order they are checked each pass.
    pub targets: Vec<String>,

    /// Check loop settings.
    pub check: CheckConfig,

    /// HTTP listener settings for `/health` and `/metrics`.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SyscheckConfig {
    fn default() -> Self {
        Self {
            targets: vec!["https://example.com".to_string()],
            check: CheckConfig::default(),
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Check loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Time between pass starts in milliseconds.
    pub interval_ms: u64,

    /// Probe all targets of a pass concurrently instead of one after another.
    pub concurrent: bool,
}

impl CheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            interval_ms: 30_000,
            concurrent: false,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Seconds in-flight requests get to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,

    /// Request timeout for the status endpoints in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            shutdown_grace_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

/// Where `/metrics` gets its numbers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackend {
    /// Render the result store's own counters.
    #[default]
    Builtin,
    /// Export through the `metrics` facade and a Prometheus recorder.
    Prometheus,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error or a full
    /// `EnvFilter` string). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Metrics backend behind `/metrics`.
    pub metrics_backend: MetricsBackend,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_backend: MetricsBackend::Builtin,
        }
    }
}
