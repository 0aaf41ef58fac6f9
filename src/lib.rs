// src/lib.rs

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use services::records::RecordService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub records: RecordService,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            records: RecordService::new(),
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod ipo_records;
}

pub mod services {
    pub mod aggregation;
    pub mod records;
    pub mod validation;
}

pub mod config;
pub mod error;
pub mod models;
pub mod handlers;

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route(
            "/api/records",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route("/api/records/bulk", post(handlers::records::bulk_create_records))
        .route(
            "/api/grouped-records",
            get(handlers::grouped_records::get_grouped_records),
        )
        .route("/api/stats", get(handlers::stats::get_stats))
        .route("/api/underwriters", get(handlers::underwriters::list_underwriters))
        .route(
            "/api/underwriters/performance",
            get(handlers::underwriters::get_underwriter_performance),
        )
        .route("/api/record/create", post(handlers::records::create_record))
        .route("/api/record/update", post(handlers::record::update_record))
        .route("/api/record/delete", post(handlers::record::delete_record))
        .route("/api/record/{id}", get(handlers::record::get_record))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> (axum::http::StatusCode, Json<error::ErrorResponse>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(error::ErrorResponse {
            error: "Not found".to_string(),
            message: None,
        }),
    )
}
