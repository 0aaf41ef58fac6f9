//! Underwriter Handlers
//!
//! GET /api/underwriters and GET /api/underwriters/performance

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use crate::error::AppError;
use crate::models::query::{PerformanceQuery, UnderwritersQuery};
use crate::models::stats::{PerformanceResponse, UnderwriterCountsResponse};
use crate::AppState;

/// Deal counts per underwriter, most active first
///
/// GET /api/underwriters?search=A
pub async fn list_underwriters(
    State(state): State<AppState>,
    Query(query): Query<UnderwritersQuery>,
) -> Result<Json<UnderwriterCountsResponse>, AppError> {
    let data = state
        .records
        .underwriter_counts(&state.db, query.search.as_deref())
        .await?;
    let total = data.len();
    Ok(Json(UnderwriterCountsResponse { data, total }))
}

/// Ranked per-underwriter return statistics over grouped records
///
/// GET /api/underwriters/performance
///
/// # Query Parameters
///
/// - `minDeals` - Hide underwriters with fewer deals (default: 1)
/// - `limit` - Maximum number of entries
///
/// Window averages with no observations are `null`.
pub async fn get_underwriter_performance(
    State(state): State<AppState>,
    Query(query): Query<PerformanceQuery>,
) -> Result<Json<PerformanceResponse>, AppError> {
    info!(
        min_deals = ?query.min_deals,
        limit = ?query.limit,
        "Underwriter performance request received"
    );

    let (data, total) = state.records.performance(&state.db, &query).await?;
    info!(count = data.len(), total = total, "Underwriter performance returned");

    Ok(Json(PerformanceResponse {
        data,
        total,
        min_deals: query.min_deals.unwrap_or(1),
    }))
}
