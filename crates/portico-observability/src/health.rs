//! Operational endpoints on the serving listener
//!
//! The edge mounts `/healthz`, `/readyz`, and `/metrics` next to tenant
//! traffic rather than on a side port, so probes exercise the same
//! listener that serves requests. `/healthz` says the process is up;
//! `/readyz` consults the pluggable [`ReadinessChecker`] (in practice,
//! whether the tenant directory answers lookups).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use once_cell::sync::Lazy;
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Metrics;

static STARTED: Lazy<Instant> = Lazy::new(Instant::now);

/// `/healthz` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// `/readyz` payload. Per-dependency detail lives in the entries; the
/// top-level status is the rollup the probe acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub dependencies: Vec<DependencyStatus>,
}

/// One dependency's observed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency name (e.g. "tenant-directory")
    pub name: String,
    /// Dependency status
    pub status: String,
    /// Optional detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Answers `/readyz`. Implementations report the rollup and the
/// per-dependency states; the edge's checker probes the tenant
/// directory in the background.
pub trait ReadinessChecker: Send + Sync {
    fn is_ready(&self) -> bool;

    fn dependency_statuses(&self) -> Vec<DependencyStatus>;
}

/// State behind the operational endpoints.
#[derive(Clone)]
pub struct HealthState {
    pub metrics: Arc<Metrics>,
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    /// State without a readiness checker; `/readyz` always reports ready.
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    pub fn with_readiness_checker(
        metrics: Arc<Metrics>,
        readiness_checker: Arc<dyn ReadinessChecker>,
    ) -> Self {
        Self {
            metrics,
            readiness_checker: Some(readiness_checker),
        }
    }
}

/// The operational router, merged into the serving app.
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "portico-edge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: STARTED.elapsed().as_secs(),
    })
}

async fn readyz(State(state): State<HealthState>) -> Response {
    let (ready, dependencies) = match &state.readiness_checker {
        Some(checker) => (checker.is_ready(), checker.dependency_statuses()),
        None => (true, Vec::new()),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        dependencies,
    };

    (status, Json(body)).into_response()
}

async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let families = state.metrics.registry().gather();

    match TextEncoder::new().encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", err),
        )
            .into_response(),
    }
}
