//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level so operators can turn up
//! verbosity without touching the unit file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` if set and valid, else `level` applied to
/// this crate and `tower_http`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level))
}

fn default_filter(level: &str) -> EnvFilter {
    if level.contains('=') {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(format!("syscheck={level},tower_http={level}"))
    }
}

/// Initialize the global tracing subscriber.
pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
