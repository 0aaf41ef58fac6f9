//! Records Handler
//!
//! GET/POST /api/records and POST /api/records/bulk

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::query::RecordsQuery;
use crate::models::record::{
    BulkCreateRequest, BulkCreateResponse, CreateRecordRequest, DataResponse, IpoRecord,
};
use crate::services::validation::validate_create;
use crate::AppState;

/// Get a page of IPO records
///
/// GET /api/records
///
/// # Query Parameters
///
/// - `limit` - Page size (default: 100, max: 500)
/// - `offset` - Rows to skip (default: 0)
/// - `search` - Search term
/// - `searchType` - `underwriter` (exact code, default) or `stock` (code or name substring)
///
/// # Response
///
/// ```json
/// {
///   "data": [{ "id": 1, "code": "GOTO", "underwriters": ["AH", "BC"], "returnD1": 0.23, ... }],
///   "total": 1,
///   "count": 1
/// }
/// ```
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<DataResponse<IpoRecord>>, AppError> {
    info!(
        limit = query.limit,
        offset = query.offset,
        search = ?query.search,
        "Records list request received"
    );

    if let Err(e) = query.validate() {
        warn!(error = %e, "Invalid query parameters");
        return Err(AppError::Validation(e));
    }

    let (records, total) = state.records.list(&state.db, &query).await?;
    info!(count = records.len(), total = total, "Records list returned");

    Ok(Json(DataResponse::new(records, total)))
}

/// Create one IPO record
///
/// POST /api/records (also POST /api/record/create)
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IpoRecord>), AppError> {
    let Json(payload) = payload?;
    let record = validate_create(payload)?;
    let created = state.records.create(&state.db, record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Insert many records; each one succeeds or fails on its own
///
/// POST /api/records/bulk
pub async fn bulk_create_records(
    State(state): State<AppState>,
    payload: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> Result<Json<BulkCreateResponse>, AppError> {
    let Json(payload) = payload?;
    info!(records = payload.data.len(), "Bulk create request received");
    Ok(Json(state.records.bulk_create(&state.db, payload.data).await))
}
