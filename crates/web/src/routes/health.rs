//! Probe endpoints. None of these touch the session.

use axum::{extract::State, http::StatusCode};
use sqlx::PgPool;

/// Plain `OK` for uptime monitors.
pub async fn ping() -> &'static str {
    "OK"
}

/// Liveness check. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness check: `503` while the database is unreachable.
pub async fn readiness(State(pool): State<PgPool>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
