//! The check loop.
//!
//! # Responsibilities
//! - Run one pass immediately, then one per interval tick
//! - Probe every target per pass and record the outcome
//! - Exit when the shutdown signal arrives
//!
//! # Design Decisions
//! - Probe failures become store state; they never stop the loop
//! - Shutdown is checked at the tick wait and again before each probe;
//!   a probe already in flight always completes
//! - Sequential passes complete in configured order; concurrent passes
//!   start in configured order and record in completion order

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::health::probe::{Probe, ProbeError};
use crate::health::store::{CheckResult, ResultStore};
use crate::observability::metrics::{MetricsSink, NoopSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
    Completed,
    Interrupted,
}

pub struct CheckLoop<P> {
    targets: Vec<String>,
    probe: P,
    store: Arc<ResultStore>,
    sink: Arc<dyn MetricsSink>,
    interval: Duration,
    concurrent: bool,
}

impl<P: Probe> CheckLoop<P> {
    pub fn new(targets: Vec<String>, probe: P, store: Arc<ResultStore>, interval: Duration) -> Self {
        Self {
            targets,
            probe,
            store,
            sink: Arc::new(NoopSink),
            interval,
            concurrent: false,
        }
    }

    /// Report every probe outcome to `sink` as well as the store.
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Probe all targets of a pass at once.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Run until `shutdown` fires (or its sender is dropped).
    ///
    /// Returns the number of passes that ran to completion.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> u64 {
        tracing::info!(
            targets = self.targets.len(),
            interval_ms = self.interval.as_millis() as u64,
            concurrent = self.concurrent,
            "Check loop starting"
        );

        // First tick completes immediately, giving the startup pass.
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut passes = 0;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Check loop received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    let started = Instant::now();
                    let outcome = if self.concurrent {
                        self.run_concurrent_pass(&mut shutdown).await
                    } else {
                        self.run_sequential_pass(&mut shutdown).await
                    };

                    if outcome == PassOutcome::Interrupted {
                        tracing::info!("Shutdown requested mid-pass, exiting loop");
                        break;
                    }

                    passes += 1;
                    tracing::debug!(
                        pass = passes,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Pass completed"
                    );
                }
            }
        }

        tracing::info!(passes, "Check loop stopped");
        passes
    }

    async fn run_sequential_pass(&self, shutdown: &mut broadcast::Receiver<()>) -> PassOutcome {
        for target in &self.targets {
            if shutdown_requested(shutdown) {
                return PassOutcome::Interrupted;
            }
            let outcome = self.probe.check(target).await;
            self.record(target, outcome);
        }
        PassOutcome::Completed
    }

    async fn run_concurrent_pass(&self, shutdown: &mut broadcast::Receiver<()>) -> PassOutcome {
        if shutdown_requested(shutdown) {
            return PassOutcome::Interrupted;
        }

        let mut in_flight: FuturesUnordered<_> = self
            .targets
            .iter()
            .map(|target| async move { (target, self.probe.check(target).await) })
            .collect();

        while let Some((target, outcome)) = in_flight.next().await {
            self.record(target, outcome);
        }
        PassOutcome::Completed
    }

    fn record(&self, target: &str, outcome: Result<u16, ProbeError>) {
        let checked_at = Some(Utc::now());

        match outcome {
            Ok(status_code) => {
                self.store.update(
                    CheckResult {
                        target: target.to_string(),
                        status_code,
                        last_error: String::new(),
                        checked_at,
                    },
                    true,
                );
                self.sink.record_success();
                tracing::info!(url = %target, status = status_code, "OK");
            }
            Err(e) => {
                self.store.update(
                    CheckResult {
                        target: target.to_string(),
                        status_code: e.status_code(),
                        last_error: e.to_string(),
                        checked_at,
                    },
                    false,
                );
                self.sink.record_failure();
                tracing::warn!(url = %target, error = %e, "FAIL");
            }
        }
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}
