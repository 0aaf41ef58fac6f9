//! Single Record Handler
//!
//! GET /api/record/{id} and the POST create/update/delete endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use crate::error::AppError;
use crate::models::record::{
    DeleteRecordRequest, IpoRecord, MessageResponse, RecordId, UpdateRecordRequest,
};
use crate::services::validation::validate_update;
use crate::AppState;

/// Resolve a client id to a primary key. Ids that cannot exist are reported
/// as not found rather than invalid.
fn resolve_id(id: Option<RecordId>) -> Result<i32, AppError> {
    let id = id.ok_or_else(|| AppError::validation("id is required"))?;
    id.as_key()
        .ok_or_else(|| AppError::NotFound("Record".to_string()))
}

/// GET /api/record/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IpoRecord>, AppError> {
    let id = resolve_id(Some(RecordId::Text(id)))?;
    let record = state.records.get(&state.db, id).await?;
    Ok(Json(record))
}

/// POST /api/record/update
///
/// Partial update: only fields present in the body change.
///
/// ```json
/// { "id": 12, "returnD3": 0.041, "listingBoard": "Development" }
/// ```
pub async fn update_record(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> Result<Json<IpoRecord>, AppError> {
    let Json(mut payload) = payload?;
    let id = resolve_id(payload.id.take())?;
    info!(id = id, "Record update request received");

    let changes = validate_update(payload)?;
    let updated = state.records.update(&state.db, id, changes).await?;
    Ok(Json(updated))
}

/// POST /api/record/delete
pub async fn delete_record(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRecordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    let id = resolve_id(payload.id)?;
    info!(id = id, "Record delete request received");

    state.records.delete(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Record deleted".to_string(),
    }))
}
