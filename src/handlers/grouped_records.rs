//! Grouped Records Handler
//!
//! GET /api/grouped-records: one entry per stock code with underwriters merged.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::query::GroupedRecordsQuery;
use crate::models::record::{DataResponse, GroupedRecord};
use crate::AppState;

/// Get grouped IPO records
///
/// GET /api/grouped-records
///
/// Same search parameters as `/api/records`. `limit` caps the number of
/// groups after grouping; `total` counts all groups.
pub async fn get_grouped_records(
    State(state): State<AppState>,
    Query(query): Query<GroupedRecordsQuery>,
) -> Result<Json<DataResponse<GroupedRecord>>, AppError> {
    info!(
        limit = query.limit,
        search = ?query.search,
        "Grouped records request received"
    );

    if let Err(e) = query.validate() {
        warn!(error = %e, "Invalid query parameters");
        return Err(AppError::Validation(e));
    }

    let (groups, total) = state.records.grouped(&state.db, &query).await?;
    info!(count = groups.len(), total = total, "Grouped records returned");

    Ok(Json(DataResponse::new(groups, total)))
}
