//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for `/health` and `/metrics`
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until the shutdown signal, then drain

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::health::ResultStore;
use crate::http::handlers::{get_health, get_metrics};
use crate::http::request::UuidRequestId;
use crate::observability::MetricsEncoder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResultStore>,
    pub encoder: MetricsEncoder,
}

/// HTTP server exposing the result store.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState, config: &ListenerConfig) -> Self {
        let router = Self::build_router(state, Duration::from_secs(config.request_timeout_secs));
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(get_health))
            .route("/metrics", get(get_metrics))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Serve on `listener` until `shutdown` fires, then stop accepting and
    /// wait for in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
