//! Single-shot HTTP probes.
//!
//! # Responsibilities
//! - Issue one GET per call, bounded by the configured timeout
//! - Classify the outcome: status code, or why there was none
//!
//! # Design Decisions
//! - No retries; the next tick is the retry
//! - Status >= 400 is a failure that still carries the code
//! - Body is drained and discarded so the connection can be reused

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The request could not be built (bad URL, unsupported scheme).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request could not be sent or no response arrived.
    #[error("{0}")]
    Network(String),

    /// No response within the probe timeout.
    #[error("timeout")]
    Timeout,

    /// The target answered with an error status.
    #[error("unexpected status code {0}")]
    HttpStatus(u16),
}

impl ProbeError {
    /// Status code to record alongside this error (0 when none was received).
    pub fn status_code(&self) -> u16 {
        match self {
            ProbeError::HttpStatus(code) => *code,
            _ => 0,
        }
    }
}

/// Something that can check one target.
pub trait Probe: Send + Sync + 'static {
    /// Check `target` once, returning the received status code on success.
    fn check(&self, target: &str) -> impl Future<Output = Result<u16, ProbeError>> + Send;
}

/// Probe backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("syscheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Probe for HttpProbe {
    async fn check(&self, target: &str) -> Result<u16, ProbeError> {
        let url = reqwest::Url::parse(target).map_err(|e| ProbeError::InvalidRequest(e.to_string()))?;
        let deadline = Instant::now() + self.timeout;

        let response = match time::timeout_at(deadline, self.client.get(url).send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify(e)),
            Err(_) => return Err(ProbeError::Timeout),
        };

        let status = response.status().as_u16();

        // The status is what matters; a slow or broken body does not change it.
        let _ = time::timeout_at(deadline, response.bytes()).await;

        if status >= 400 {
            return Err(ProbeError::HttpStatus(status));
        }
        Ok(status)
    }
}

fn classify(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else if e.is_builder() {
        ProbeError::InvalidRequest(e.to_string())
    } else {
        ProbeError::Network(e.to_string())
    }
}
