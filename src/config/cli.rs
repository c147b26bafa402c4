//! Command-line flags.
//!
//! Every flag is optional; anything left unset falls through to the config
//! file or the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::parse_targets;
use crate::config::schema::{MetricsBackend, SyscheckConfig};

#[derive(Debug, Clone, Parser, Default)]
#[command(name = "syscheck")]
#[command(about = "Polls HTTP targets and serves /health and /metrics", long_about = None)]
pub struct Cli {
    /// TOML config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated HTTP targets.
    #[arg(short, long)]
    pub targets: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Health-check period in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// HTTP server address.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Probe targets of a pass concurrently.
    #[arg(long)]
    pub concurrent: bool,

    /// Metrics backend behind /metrics.
    #[arg(long, value_enum)]
    pub metrics_backend: Option<MetricsBackendArg>,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MetricsBackendArg {
    Builtin,
    Prometheus,
}

impl From<MetricsBackendArg> for MetricsBackend {
    fn from(arg: MetricsBackendArg) -> Self {
        match arg {
            MetricsBackendArg::Builtin => MetricsBackend::Builtin,
            MetricsBackendArg::Prometheus => MetricsBackend::Prometheus,
        }
    }
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut SyscheckConfig) {
        if let Some(raw) = &self.targets {
            config.targets = parse_targets(raw);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.check.timeout_ms = timeout_ms;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.check.interval_ms = interval_ms;
        }
        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if self.concurrent {
            config.check.concurrent = true;
        }
        if let Some(backend) = self.metrics_backend {
            config.observability.metrics_backend = backend.into();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
