//! syscheck daemon
//!
//! Polls HTTP targets and reports their health.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                          SYSCHECK                            │
//!   │                                                              │
//!   │   ┌────────────┐   probe    ┌─────────┐   GET               │
//!   │   │ check loop │──────────▶│  probe  │─────────────────────┼──▶ Targets
//!   │   │ (interval) │◀──────────│(reqwest)│◀────────────────────┼─── status
//!   │   └─────┬──────┘  outcome   └─────────┘                     │
//!   │         │ update                                             │
//!   │         ▼                                                    │
//!   │   ┌────────────┐  snapshot  ┌──────────┐  /health, /metrics │
//!   │   │   result   │──────────▶│   http   │◀───────────────────┼─── Clients
//!   │   │   store    │            │  server  │────────────────────┼──▶
//!   │   └────────────┘            └──────────┘                     │
//!   │                                                              │
//!   │   config · logging · metrics sink · shutdown coordination    │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example systemd unit
//!
//! ```text
//! [Unit]
//! Description=syscheck health-check daemon
//! After=network.target
//!
//! [Service]
//! ExecStart=/usr/local/bin/syscheck --targets=https://www.example.com,https://www.github.com --interval-ms=10000
//! Restart=always
//! User=syscheck
//! Group=syscheck
//!
//! [Install]
//! WantedBy=multi-user.target
//! ```

use clap::Parser;

use syscheck::config::{resolve_config, Cli};
use syscheck::lifecycle::{shutdown_signal, Daemon};
use syscheck::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging is configured from the resolved config, so config errors go
    // straight to stderr.
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("syscheck: {e}");
            std::process::exit(2);
        }
    };

    init_logging(&config.observability.log_level);

    tracing::info!("syscheck v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        targets = config.targets.len(),
        timeout_ms = config.check.timeout_ms,
        interval_ms = config.check.interval_ms,
        metrics_backend = ?config.observability.metrics_backend,
        "Configuration loaded"
    );

    let daemon = Daemon::new(config)?;
    let listener = daemon.bind().await?;

    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    daemon.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
