//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::models::stats::HealthResponse;
use crate::AppState;

/// GET /api/health
///
/// Pings the database; 503 when it is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
                message: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error".to_string(),
                    database: "disconnected".to_string(),
                    message: Some(e.to_string()),
                }),
            )
        }
    }
}
