//! Validation and normalization of record payloads
//!
//! Runs before any store access. Produces typed, normalized values that the
//! record service writes as-is.

use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::record::{
    CreateRecordRequest, ListingBoard, UpdateRecordRequest, RETURN_WINDOWS,
};

/// Column widths of `ipo_records`
pub const CODE_MAX_LEN: usize = 16;
pub const COMPANY_NAME_MAX_LEN: usize = 255;
pub const UNDERWRITER_MAX_LEN: usize = 16;

/// Validated payload for inserting a record
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub code: String,
    pub company_name: String,
    pub underwriters: Vec<String>,
    pub ipo_price: Option<Decimal>,
    pub listing_board: Option<ListingBoard>,
    pub listing_date: Option<NaiveDate>,
    pub returns: [Option<f64>; RETURN_WINDOWS],
    pub record: Option<String>,
}

/// Validated partial update. `None` leaves the column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    pub code: Option<String>,
    pub company_name: Option<String>,
    pub underwriters: Option<Vec<String>>,
    pub ipo_price: Option<Option<Decimal>>,
    pub listing_board: Option<Option<ListingBoard>>,
    pub listing_date: Option<Option<NaiveDate>>,
    pub returns: [Option<Option<f64>>; RETURN_WINDOWS],
    pub record: Option<Option<String>>,
}

/// Trim, uppercase and de-duplicate underwriter codes, dropping blanks
pub fn normalize_underwriters(raw: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(raw.len());
    for uw in raw {
        let uw = uw.trim().to_uppercase();
        if !uw.is_empty() && !normalized.contains(&uw) {
            normalized.push(uw);
        }
    }
    normalized
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept)
pub fn parse_listing_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::validation(format!("listingDate '{}' is not a valid date", raw)))
}

fn validate_price(price: f64) -> Result<Decimal, AppError> {
    if !price.is_finite() {
        return Err(AppError::validation("ipoPrice must be a positive number"));
    }
    let price = Decimal::from_f64(price)
        .map(|p| p.round_dp(4))
        .ok_or_else(|| AppError::validation("ipoPrice is out of range"))?;
    // Checked after rounding: the column keeps 4 decimal places
    if price <= Decimal::ZERO {
        return Err(AppError::validation("ipoPrice must be a positive number"));
    }
    Ok(price)
}

fn validate_board(raw: &str) -> Result<Option<ListingBoard>, AppError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    ListingBoard::parse(raw)
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("listingBoard '{}' is not a known board", raw)))
}

fn validate_date(raw: &str) -> Result<Option<NaiveDate>, AppError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_listing_date(raw).map(Some)
}

fn validate_return(window: usize, value: f64) -> Result<f64, AppError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::validation(format!(
            "returnD{} must be a finite number",
            window + 1
        )))
    }
}

fn required_text(value: Option<&str>, field: &str, max_len: usize) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if v.is_empty() => Err(AppError::validation(format!("{} is required", field))),
        Some(v) if v.chars().count() > max_len => Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, max_len
        ))),
        Some(v) => Ok(v.to_string()),
        None => Err(AppError::validation(format!("{} is required", field))),
    }
}

fn required_underwriters(raw: &[String]) -> Result<Vec<String>, AppError> {
    let normalized = normalize_underwriters(raw);
    if normalized.is_empty() {
        return Err(AppError::validation("underwriters must not be empty"));
    }
    if let Some(long) = normalized
        .iter()
        .find(|uw| uw.chars().count() > UNDERWRITER_MAX_LEN)
    {
        return Err(AppError::validation(format!(
            "underwriter '{}' must be at most {} characters",
            long, UNDERWRITER_MAX_LEN
        )));
    }
    Ok(normalized)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validate a create payload
pub fn validate_create(request: CreateRecordRequest) -> Result<NewRecord, AppError> {
    let code = required_text(request.code.as_deref(), "code", CODE_MAX_LEN)?.to_uppercase();
    let company_name = required_text(
        request.company_name.as_deref(),
        "companyName",
        COMPANY_NAME_MAX_LEN,
    )?;
    let underwriters = match request.underwriters.as_deref() {
        Some(raw) => required_underwriters(raw)?,
        None => return Err(AppError::validation("underwriters is required")),
    };

    let ipo_price = request.ipo_price.map(validate_price).transpose()?;
    let listing_board = match request.listing_board.as_deref() {
        Some(raw) => validate_board(raw)?,
        None => None,
    };
    let listing_date = match request.listing_date.as_deref() {
        Some(raw) => validate_date(raw)?,
        None => None,
    };

    let mut returns = [None; RETURN_WINDOWS];
    for (window, value) in request.returns().into_iter().enumerate() {
        returns[window] = value.map(|v| validate_return(window, v)).transpose()?;
    }

    Ok(NewRecord {
        code,
        company_name,
        underwriters,
        ipo_price,
        listing_board,
        listing_date,
        returns,
        record: optional_text(request.record),
    })
}

/// Validate an update payload. The id is resolved by the caller.
pub fn validate_update(request: UpdateRecordRequest) -> Result<RecordChanges, AppError> {
    let returns_in = request.returns();

    let code = request
        .code
        .as_deref()
        .map(|c| required_text(Some(c), "code", CODE_MAX_LEN).map(|c| c.to_uppercase()))
        .transpose()?;
    let company_name = request
        .company_name
        .as_deref()
        .map(|c| required_text(Some(c), "companyName", COMPANY_NAME_MAX_LEN))
        .transpose()?;
    let underwriters = request
        .underwriters
        .as_deref()
        .map(required_underwriters)
        .transpose()?;

    let ipo_price = match request.ipo_price {
        Some(Some(price)) => Some(Some(validate_price(price)?)),
        Some(None) => Some(None),
        None => None,
    };
    let listing_board = match request.listing_board {
        Some(Some(raw)) => Some(validate_board(&raw)?),
        Some(None) => Some(None),
        None => None,
    };
    let listing_date = match request.listing_date {
        Some(Some(raw)) => Some(validate_date(&raw)?),
        Some(None) => Some(None),
        None => None,
    };

    let mut returns = [None; RETURN_WINDOWS];
    for (window, change) in returns_in.into_iter().enumerate() {
        returns[window] = match change {
            Some(Some(value)) => Some(Some(validate_return(window, value)?)),
            Some(None) => Some(None),
            None => None,
        };
    }

    Ok(RecordChanges {
        code,
        company_name,
        underwriters,
        ipo_price,
        listing_board,
        listing_date,
        returns,
        record: request.record.map(optional_text),
    })
}
