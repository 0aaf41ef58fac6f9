//! IPO record request/response models
//!
//! Shapes for the record CRUD endpoints and the grouped listing.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::ipo_records;

/// Number of tracked return windows (D+1..D+7)
pub const RETURN_WINDOWS: usize = 7;

/// IDX listing board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingBoard {
    /// Papan Utama
    Main,
    /// Papan Pengembangan
    Development,
    /// Papan Akselerasi
    Acceleration,
}

impl ListingBoard {
    /// Parse a board name, accepting English or Indonesian names in any case
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "main" | "utama" => Some(Self::Main),
            "development" | "pengembangan" => Some(Self::Development),
            "acceleration" | "akselerasi" => Some(Self::Acceleration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Development => "Development",
            Self::Acceleration => "Acceleration",
        }
    }
}

/// IPO record as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpoRecord {
    pub id: i32,
    pub code: String,
    pub company_name: String,
    pub underwriters: Vec<String>,
    /// Legacy single underwriter (older imports only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uw: Option<String>,
    pub ipo_price: Option<f64>,
    pub listing_board: Option<ListingBoard>,
    pub listing_date: Option<NaiveDate>,
    pub return_d1: Option<f64>,
    pub return_d2: Option<f64>,
    pub return_d3: Option<f64>,
    pub return_d4: Option<f64>,
    pub return_d5: Option<f64>,
    pub return_d6: Option<f64>,
    pub return_d7: Option<f64>,
    pub record: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl IpoRecord {
    /// Returns D+1..D+7 in window order. Non-finite values count as not observed.
    pub fn returns(&self) -> [Option<f64>; RETURN_WINDOWS] {
        [
            self.return_d1,
            self.return_d2,
            self.return_d3,
            self.return_d4,
            self.return_d5,
            self.return_d6,
            self.return_d7,
        ]
        .map(|value| value.filter(|v| v.is_finite()))
    }

    /// Underwriter set of this record, falling back to the legacy `uw` field
    /// when the list is empty. Always uppercase and free of duplicates.
    pub fn resolved_underwriters(&self) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::with_capacity(self.underwriters.len());
        let source = if self.underwriters.is_empty() {
            self.uw.iter().cloned().collect::<Vec<_>>()
        } else {
            self.underwriters.clone()
        };
        for uw in source {
            let uw = uw.trim().to_uppercase();
            if !uw.is_empty() && !resolved.contains(&uw) {
                resolved.push(uw);
            }
        }
        resolved
    }

    /// Key used for grouping rows of the same listing
    pub fn group_key(&self) -> String {
        self.code.trim().to_uppercase()
    }
}

impl From<ipo_records::Model> for IpoRecord {
    fn from(model: ipo_records::Model) -> Self {
        let underwriters: Vec<String> = match serde_json::from_value(model.underwriters) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(id = model.id, error = %e, "Malformed underwriters column, treating as empty");
                Vec::new()
            }
        };

        Self {
            id: model.id,
            code: model.code,
            company_name: model.company_name,
            underwriters,
            uw: model.uw,
            ipo_price: model.ipo_price.and_then(|p| p.to_f64()),
            listing_board: model.listing_board.as_deref().and_then(ListingBoard::parse),
            listing_date: model.listing_date,
            return_d1: model.return_d1,
            return_d2: model.return_d2,
            return_d3: model.return_d3,
            return_d4: model.return_d4,
            return_d5: model.return_d5,
            return_d6: model.return_d6,
            return_d7: model.return_d7,
            record: model.record,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        }
    }
}

/// One logical listing per stock code with underwriters merged across rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedRecord {
    #[serde(flatten)]
    pub record: IpoRecord,
    /// Number of stored rows merged into this entry
    pub merged_rows: usize,
}

/// Body for POST /api/records and POST /api/record/create
///
/// Required fields are optional here so that missing values surface as
/// validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub code: Option<String>,
    pub company_name: Option<String>,
    pub underwriters: Option<Vec<String>>,
    pub ipo_price: Option<f64>,
    pub listing_board: Option<String>,
    pub listing_date: Option<String>,
    pub return_d1: Option<f64>,
    pub return_d2: Option<f64>,
    pub return_d3: Option<f64>,
    pub return_d4: Option<f64>,
    pub return_d5: Option<f64>,
    pub return_d6: Option<f64>,
    pub return_d7: Option<f64>,
    pub record: Option<String>,
}

impl CreateRecordRequest {
    pub fn returns(&self) -> [Option<f64>; RETURN_WINDOWS] {
        [
            self.return_d1,
            self.return_d2,
            self.return_d3,
            self.return_d4,
            self.return_d5,
            self.return_d6,
            self.return_d7,
        ]
    }
}

/// Record identifier as sent by clients: a number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Resolve to a primary key. Ids that cannot be a key yield None.
    pub fn as_key(&self) -> Option<i32> {
        match self {
            Self::Int(id) => i32::try_from(*id).ok(),
            Self::Text(id) => id.trim().parse().ok(),
        }
    }
}

/// Body for POST /api/record/update
///
/// Absent fields are left unchanged. For nullable fields an explicit `null`
/// clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(alias = "_id")]
    pub id: Option<RecordId>,
    pub code: Option<String>,
    pub company_name: Option<String>,
    pub underwriters: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub ipo_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub listing_board: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub listing_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d1: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d2: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d3: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d4: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d5: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d6: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub return_d7: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub record: Option<Option<String>>,
}

impl UpdateRecordRequest {
    pub fn returns(&self) -> [Option<Option<f64>>; RETURN_WINDOWS] {
        [
            self.return_d1,
            self.return_d2,
            self.return_d3,
            self.return_d4,
            self.return_d5,
            self.return_d6,
            self.return_d7,
        ]
    }
}

/// Marks a field as present, keeping `null` distinguishable from absent
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body for POST /api/record/delete
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRecordRequest {
    #[serde(alias = "_id")]
    pub id: Option<RecordId>,
}

/// Body for POST /api/records/bulk
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    pub data: Vec<CreateRecordRequest>,
}

/// Outcome of a bulk insert; each record succeeds or fails on its own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// List envelope shared by the listing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
    /// Matching entries before pagination
    pub total: usize,
    /// Entries in this page
    pub count: usize,
}

impl<T> DataResponse<T> {
    pub fn new(data: Vec<T>, total: usize) -> Self {
        let count = data.len();
        Self { data, total, count }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
