//! Query parameters for the listing endpoints

use serde::Deserialize;

/// Default page size for listings
pub const DEFAULT_LIMIT: i64 = 100;

/// Upper bound on page size for listings
pub const MAX_LIMIT: i64 = 500;

/// How a search term is matched against records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring of stock code or company name
    Stock,
    /// Exact, case-insensitive underwriter code
    #[default]
    Underwriter,
}

/// Query parameters for GET /api/records
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    /// Page size (default: 100, clamped to 500)
    pub limit: Option<i64>,
    /// Rows to skip (default: 0)
    pub offset: Option<i64>,
    pub search: Option<String>,
    /// `stock` or `underwriter` (default)
    pub search_type: Option<SearchMode>,
}

impl RecordsQuery {
    /// Validate query parameters
    pub fn validate(&self) -> Result<(), String> {
        validate_limit(self.limit)?;
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err("offset cannot be negative".to_string());
            }
        }
        Ok(())
    }

    pub fn effective_limit(&self) -> usize {
        effective_limit(self.limit)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0).max(0) as usize
    }

    pub fn mode(&self) -> SearchMode {
        self.search_type.unwrap_or_default()
    }
}

/// Query parameters for GET /api/grouped-records
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedRecordsQuery {
    /// Maximum number of groups returned (default: 100, clamped to 500)
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub search_type: Option<SearchMode>,
}

impl GroupedRecordsQuery {
    pub fn validate(&self) -> Result<(), String> {
        validate_limit(self.limit)
    }

    pub fn effective_limit(&self) -> usize {
        effective_limit(self.limit)
    }

    pub fn mode(&self) -> SearchMode {
        self.search_type.unwrap_or_default()
    }
}

/// Query parameters for GET /api/underwriters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnderwritersQuery {
    /// Substring of the underwriter code
    pub search: Option<String>,
}

/// Query parameters for GET /api/underwriters/performance
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    /// Drop underwriters with fewer deals than this (default: 1)
    pub min_deals: Option<usize>,
    /// Maximum number of ranked entries
    pub limit: Option<usize>,
}

fn validate_limit(limit: Option<i64>) -> Result<(), String> {
    match limit {
        Some(limit) if limit < 1 => Err("limit must be at least 1".to_string()),
        _ => Ok(()),
    }
}

fn effective_limit(limit: Option<i64>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize
}
