//! Health check endpoints

use std::{collections::BTreeMap, time::Instant};

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

static STARTED_AT: Lazy<Instant> = Lazy::new(Instant::now);

/// Start the uptime clock
pub fn mark_started() {
    Lazy::force(&STARTED_AT);
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Seconds since the router was built
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: STARTED_AT.elapsed().as_secs(),
            timestamp: Utc::now(),
        }
    }
}

/// API entry point description
#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Resource name → base path
    pub endpoints: BTreeMap<String, String>,
}

/// API entry point
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "API description", body = RootResponse)
    )
)]
pub async fn root() -> Json<RootResponse> {
    let endpoints = [
        ("auth", "/api/auth"),
        ("books", "/api/books"),
        ("transactions", "/api/transactions"),
        ("messages", "/api/messages"),
        ("notifications", "/api/notifications"),
        ("ratings", "/api/ratings"),
        ("docs", "/swagger-ui"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect();

    Json(RootResponse {
        name: "Bookswap API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        timestamp: Utc::now(),
        endpoints,
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy"))
}

/// Readiness check endpoint (checks database connectivity)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<crate::AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    if state.services.repository.ping().await {
        (StatusCode::OK, Json(HealthResponse::new("ready")))
    } else {
        tracing::warn!("Readiness check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("unavailable")),
        )
    }
}
