//! Health and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::server::AppState;

/// GET /health - liveness check.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dov-bridge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /ready - readiness check backed by a datastore probe.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.store.count().await {
        Ok(records) => Ok(Json(serde_json::json!({
            "status": "ready",
            "database": "connected",
            "records": records,
        }))),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Database unavailable: {}", e),
        )),
    }
}
