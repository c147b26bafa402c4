//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! check loop / HTTP layer produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (success/failure counters)
//!
//! Consumers:
//!     → stdout / journald
//!     → /metrics (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsEncoder, MetricsSink, NoopSink, PrometheusSink};
