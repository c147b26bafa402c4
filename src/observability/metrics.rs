//! Metrics collection and exposition.
//!
//! # Metrics
//! - `syscheck_success_total` (counter): probes that got a status below 400
//! - `syscheck_failure_total` (counter): probes that failed or got >= 400
//!
//! # Design Decisions
//! - The check loop reports through [`MetricsSink`] and never knows which
//!   backend is in use
//! - The builtin backend renders the result store's own counters; the
//!   Prometheus backend goes through the `metrics` facade and
//!   `metrics-exporter-prometheus`

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::health::store::ResultStore;

pub const SUCCESS_TOTAL: &str = "syscheck_success_total";
pub const FAILURE_TOTAL: &str = "syscheck_failure_total";

/// Prometheus text exposition content type.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Receives one event per completed probe.
pub trait MetricsSink: Send + Sync {
    fn record_success(&self);
    fn record_failure(&self);
}

/// Sink for the builtin backend, where the store already counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record_success(&self) {}
    fn record_failure(&self) {}
}

/// Sink that increments `metrics` crate counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl PrometheusSink {
    /// Register descriptions and zero both counters so they are exported
    /// before the first probe finishes.
    pub fn register(&self) {
        describe_counter!(SUCCESS_TOTAL, "Number of successful health checks");
        describe_counter!(FAILURE_TOTAL, "Number of failed health checks");
        counter!(SUCCESS_TOTAL).absolute(0);
        counter!(FAILURE_TOTAL).absolute(0);
    }
}

impl MetricsSink for PrometheusSink {
    fn record_success(&self) {
        counter!(SUCCESS_TOTAL).increment(1);
    }

    fn record_failure(&self) {
        counter!(FAILURE_TOTAL).increment(1);
    }
}

/// Install the global Prometheus recorder.
///
/// Can only succeed once per process.
pub fn init_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    PrometheusSink.register();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Renders the `/metrics` body.
#[derive(Clone)]
pub enum MetricsEncoder {
    /// Two counter lines taken from the result store.
    Builtin,
    /// Whatever the Prometheus recorder has collected.
    Prometheus(PrometheusHandle),
}

impl MetricsEncoder {
    pub fn render(&self, store: &ResultStore) -> String {
        match self {
            MetricsEncoder::Builtin => {
                let (success, failure) = store.counters();
                render_counters(success, failure)
            }
            MetricsEncoder::Prometheus(handle) => handle.render(),
        }
    }
}

pub fn render_counters(success: u64, failure: u64) -> String {
    format!("{SUCCESS_TOTAL} {success}\n{FAILURE_TOTAL} {failure}\n")
}
