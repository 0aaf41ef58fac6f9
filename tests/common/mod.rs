#![allow(dead_code)]

use axum::{body::Body, http::Request, http::StatusCode, Router};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use ipo_underwriter_backend::{build_router, entities::ipo_records, AppState};
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

/// Empty mock database; any query against it fails
pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// Mock database answering the next query with `rows`
pub fn db_with_rows(rows: Vec<ipo_records::Model>) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([rows])
        .into_connection()
}

/// Build the application router over `db`
pub fn test_app(db: DatabaseConnection) -> Router {
    build_router(AppState::new(db))
}

/// Stored row with sensible defaults
pub fn record_model(id: i32, code: &str, underwriters: &[&str]) -> ipo_records::Model {
    let now = Utc::now().fixed_offset();
    ipo_records::Model {
        id,
        code: code.to_string(),
        company_name: format!("{} Tbk", code),
        underwriters: serde_json::json!(underwriters),
        uw: None,
        ipo_price: Some(Decimal::new(500, 0)),
        listing_board: Some("Main".to_string()),
        listing_date: None,
        return_d1: None,
        return_d2: None,
        return_d3: None,
        return_d4: None,
        return_d5: None,
        return_d6: None,
        return_d7: None,
        record: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request and decode the JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
