//! `/health` and `/metrics` handlers.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::health::{derive_status, CheckResult, OverallStatus, Snapshot};
use crate::http::server::AppState;
use crate::observability::metrics::CONTENT_TYPE;

/// Body of `/health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub success_count: u64,
    pub failure_count: u64,
    pub results: BTreeMap<String, CheckResult>,
}

impl From<Snapshot> for HealthReport {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            status: derive_status(&snapshot.results),
            success_count: snapshot.success_count,
            failure_count: snapshot.failure_count,
            results: snapshot.results,
        }
    }
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.store.snapshot().into())
}

pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.encoder.render(&state.store);
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}
