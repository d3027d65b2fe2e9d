//! Health and Status Routes
//!
//! Health check and system status endpoints for monitoring.
//!
//! Routes:
//! - GET /health - Basic health check
//! - GET /health/live - Liveness probe
//! - GET /health/ready - Readiness check (document store reachable)
//! - GET /status - Detailed system status

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AppState, Result};

static STARTUP_TIME: OnceLock<Instant> = OnceLock::new();

/// Total ranking requests served since startup.
pub static RANKING_REQUESTS: AtomicU64 = AtomicU64::new(0);

/// Record the startup instant. Call once from `main`.
pub fn init_startup_time() {
    STARTUP_TIME.get_or_init(Instant::now);
}

fn get_uptime_seconds() -> u64 {
    STARTUP_TIME
        .get()
        .map(|started| started.elapsed().as_secs())
        .unwrap_or(0)
}

/// Build status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check))
        .route("/status", get(system_status))
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DependencyCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<DependencyCheck>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreStatus,
    pub ranking: RankingStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub backend: &'static str,
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct RankingStatus {
    pub product_scope: &'static str,
    pub requests: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Basic health check.
///
/// GET /health
#[axum::debug_handler]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
    })
}

/// Liveness check.
///
/// GET /health/live
#[axum::debug_handler]
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Readiness check.
///
/// GET /health/ready
///
/// Returns 503 when the document store cannot be reached.
#[axum::debug_handler]
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_check = check_store(&state).await;
    let ready = store_check.status == HealthStatus::Healthy;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            checks: vec![store_check],
        }),
    )
}

/// Detailed system status.
///
/// GET /status
#[axum::debug_handler]
async fn system_status(State(state): State<AppState>) -> Result<Json<SystemStatusResponse>> {
    let connected = state.store.health_check().await.is_ok();

    Ok(Json(SystemStatusResponse {
        status: if connected {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: get_uptime_seconds(),
        store: StoreStatus {
            backend: state.store.backend_name(),
            connected,
        },
        ranking: RankingStatus {
            product_scope: state.recipes.product_scope().as_str(),
            requests: RANKING_REQUESTS.load(Ordering::Relaxed),
        },
        timestamp: Utc::now(),
    }))
}

async fn check_store(state: &AppState) -> DependencyCheck {
    let started = Instant::now();
    let result = state.store.health_check().await;
    let latency_ms = Some(started.elapsed().as_millis() as u64);

    match result {
        Ok(()) => DependencyCheck {
            name: state.store.backend_name().to_string(),
            status: HealthStatus::Healthy,
            latency_ms,
            message: None,
        },
        Err(e) => DependencyCheck {
            name: state.store.backend_name().to_string(),
            status: HealthStatus::Unhealthy,
            latency_ms,
            message: Some(e.to_string()),
        },
    }
}
