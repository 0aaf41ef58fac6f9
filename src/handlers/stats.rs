//! Stats Handler

use axum::{extract::State, Json};

use crate::error::AppError;
use crate::models::stats::StatsResponse;
use crate::AppState;

/// GET /api/stats
///
/// ```json
/// { "totalRecords": 120, "totalCompanies": 120, "totalUW": 45, "lastUpdated": "2025-01-02T03:04:05+00:00" }
/// ```
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.records.stats(&state.db).await?;
    tracing::debug!(?stats, "Stats computed");
    Ok(Json(stats))
}
