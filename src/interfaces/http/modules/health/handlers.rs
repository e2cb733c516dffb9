//! Welcome and health check handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::SharedSessionStore;
use crate::interfaces::http::common::ApiResponse;

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub sessions: SharedSessionStore,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
    pub routes: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

const ROUTES: &[&str] = &[
    "GET  /api",
    "GET  /api/health",
    "GET  /api/metrics",
    "POST /api/auth/register",
    "POST /api/auth/login",
    "POST /api/auth/logout",
    "GET  /api/auth/me",
    "GET  /api/amenities",
    "GET  /api/amenities/{id}",
    "GET  /api/reservations/by-day?amenityId={id}&date={date}",
    "GET  /api/reservations/by-user?userId={id}",
    "POST /api/reservations",
    "POST /api/csv-parser/parse",
];

#[utoipa::path(
    get,
    path = "/api",
    tag = "Health",
    responses((status = 200, description = "Welcome message", body = ApiResponse<WelcomeResponse>))
)]
pub async fn welcome() -> Json<ApiResponse<WelcomeResponse>> {
    Json(ApiResponse::success(WelcomeResponse {
        message: "Welcome to the amenity booking API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        routes: ROUTES.iter().map(|r| r.to_string()).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let db_start = Instant::now();
    let database = match state
        .db
        .execute(Statement::from_string(
            state.db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
    {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(db_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    };

    let healthy = database.status == "ok";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
            active_sessions: state.sessions.active_count(),
        }),
    )
}
