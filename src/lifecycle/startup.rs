//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration and build the result store
//! - Pick the metrics backend
//! - Start the check loop and HTTP server
//! - On shutdown, give the server a bounded drain window
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The check loop starts before the listener accepts traffic

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio::time;

use crate::config::{validation::validate_config, ConfigError, MetricsBackend, SyscheckConfig};
use crate::health::{CheckLoop, HttpProbe, ResultStore};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::{init_prometheus, MetricsEncoder, MetricsSink, NoopSink, PrometheusSink};

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to install Prometheus recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    #[error("HTTP server error: {0}")]
    Serve(#[source] io::Error),

    #[error("signal handler error: {0}")]
    Signal(#[source] io::Error),

    #[error("task failed: {0}")]
    Task(#[from] JoinError),
}

/// A configured daemon, ready to run.
pub struct Daemon {
    config: SyscheckConfig,
    store: Arc<ResultStore>,
    probe: HttpProbe,
    encoder: MetricsEncoder,
    sink: Arc<dyn MetricsSink>,
}

impl Daemon {
    /// Validate `config` and set up every subsystem except the listener.
    ///
    /// With the Prometheus backend this installs the global recorder, so it
    /// can be done once per process.
    pub fn new(config: SyscheckConfig) -> Result<Self, DaemonError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let store = Arc::new(ResultStore::new(config.targets.iter().cloned()));
        let probe = HttpProbe::new(config.check.timeout())?;

        let (encoder, sink): (MetricsEncoder, Arc<dyn MetricsSink>) = match config.observability.metrics_backend {
            MetricsBackend::Builtin => (MetricsEncoder::Builtin, Arc::new(NoopSink)),
            MetricsBackend::Prometheus => (MetricsEncoder::Prometheus(init_prometheus()?), Arc::new(PrometheusSink)),
        };

        Ok(Self {
            config,
            store,
            probe,
            encoder,
            sink,
        })
    }

    pub fn config(&self) -> &SyscheckConfig {
        &self.config
    }

    /// Handle to the shared result store.
    pub fn store(&self) -> Arc<ResultStore> {
        self.store.clone()
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> Result<TcpListener, DaemonError> {
        let address = self.config.listener.bind_address.clone();
        TcpListener::bind(&address)
            .await
            .map_err(|source| DaemonError::Bind { address, source })
    }

    /// Run until `signal` resolves, then shut down.
    pub async fn run<F>(self, listener: TcpListener, signal: F) -> Result<(), DaemonError>
    where
        F: Future<Output = io::Result<()>>,
    {
        let shutdown = Shutdown::new();
        let grace = Duration::from_secs(self.config.listener.shutdown_grace_secs);

        let check_loop = CheckLoop::new(
            self.config.targets.clone(),
            self.probe,
            self.store.clone(),
            self.config.check.interval(),
        )
        .with_sink(self.sink)
        .concurrent(self.config.check.concurrent);
        let loop_task = tokio::spawn(check_loop.run(shutdown.subscribe()));

        let state = AppState {
            store: self.store,
            encoder: self.encoder,
        };
        let server = HttpServer::new(state, &self.config.listener);
        let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

        let mut result = Ok(());
        tokio::select! {
            signalled = signal => {
                if let Err(e) = signalled {
                    tracing::error!(error = %e, "Signal handler failed, shutting down");
                    result = Err(DaemonError::Signal(e));
                }
            }
            served = &mut server_task => {
                // The server only returns on its own when it failed.
                shutdown.trigger();
                let _ = loop_task.await;
                return match served? {
                    Ok(()) => Ok(()),
                    Err(e) => Err(DaemonError::Serve(e)),
                };
            }
        }

        shutdown.trigger();

        match time::timeout(grace, &mut server_task).await {
            Ok(served) => served?.map_err(DaemonError::Serve)?,
            Err(_) => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, aborting in-flight requests");
                server_task.abort();
            }
        }

        let passes = loop_task.await?;
        tracing::info!(passes, "syscheck shut down cleanly");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationError;

    #[test]
    fn rejects_invalid_config() {
        let mut config = SyscheckConfig::default();
        config.targets.clear();

        match Daemon::new(config) {
            Err(DaemonError::Config(ConfigError::Validation(errors))) => {
                assert_eq!(errors, vec![ValidationError::NoTargets]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("empty target list accepted"),
        }
    }

    #[test]
    fn store_holds_every_target() {
        let mut config = SyscheckConfig::default();
        config.targets = vec!["http://a.test".into(), "http://b.test".into()];

        let daemon = Daemon::new(config).unwrap();
        let snap = daemon.store().snapshot();
        assert_eq!(snap.results.keys().collect::<Vec<_>>(), vec!["http://a.test", "http://b.test"]);
    }

    #[tokio::test]
    async fn bind_error_names_address() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = SyscheckConfig::default();
        config.listener.bind_address = taken.local_addr().unwrap().to_string();

        let daemon = Daemon::new(config).unwrap();
        match daemon.bind().await {
            Err(DaemonError::Bind { address, .. }) => {
                assert_eq!(address, taken.local_addr().unwrap().to_string());
            }
            other => panic!("expected bind error, got {:?}", other.map(|_| ())),
        }
    }
}
