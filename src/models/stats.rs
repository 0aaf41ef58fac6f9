//! Summary and per-underwriter statistics models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::record::RETURN_WINDOWS;

/// Response for GET /api/stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Distinct stock codes
    pub total_records: usize,
    /// Distinct company names
    pub total_companies: usize,
    /// Distinct underwriters
    #[serde(rename = "totalUW")]
    pub total_uw: usize,
    pub last_updated: Option<DateTime<FixedOffset>>,
}

/// Deal count for one underwriter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderwriterCount {
    pub code: String,
    pub ipo_count: usize,
    #[serde(rename = "totalIPOs")]
    pub total_ipos: usize,
}

/// Response for GET /api/underwriters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderwriterCountsResponse {
    pub data: Vec<UnderwriterCount>,
    pub total: usize,
}

/// Return statistics for one underwriter across its deals
///
/// Window averages are `None` when no deal had data for that window; that
/// means "no data", not a zero return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderwriterStat {
    pub code: String,
    pub avg_return_d1: Option<f64>,
    pub avg_return_d2: Option<f64>,
    pub avg_return_d3: Option<f64>,
    pub avg_return_d4: Option<f64>,
    pub avg_return_d5: Option<f64>,
    pub avg_return_d6: Option<f64>,
    pub avg_return_d7: Option<f64>,
    pub total_deals: usize,
    /// Mean of the window averages that have data
    pub avg_return_overall: Option<f64>,
    /// Fraction of deals (0.0..=1.0) whose own mean return is positive
    pub success_rate: f64,
}

impl UnderwriterStat {
    pub fn new(
        code: String,
        window_averages: [Option<f64>; RETURN_WINDOWS],
        total_deals: usize,
        avg_return_overall: Option<f64>,
        success_rate: f64,
    ) -> Self {
        let [d1, d2, d3, d4, d5, d6, d7] = window_averages;
        Self {
            code,
            avg_return_d1: d1,
            avg_return_d2: d2,
            avg_return_d3: d3,
            avg_return_d4: d4,
            avg_return_d5: d5,
            avg_return_d6: d6,
            avg_return_d7: d7,
            total_deals,
            avg_return_overall,
            success_rate,
        }
    }

    pub fn window_averages(&self) -> [Option<f64>; RETURN_WINDOWS] {
        [
            self.avg_return_d1,
            self.avg_return_d2,
            self.avg_return_d3,
            self.avg_return_d4,
            self.avg_return_d5,
            self.avg_return_d6,
            self.avg_return_d7,
        ]
    }
}

/// Response for GET /api/underwriters/performance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub data: Vec<UnderwriterStat>,
    /// Ranked underwriters before `limit`
    pub total: usize,
    pub min_deals: usize,
}

/// Response for GET /api/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_field_names() {
        let json = serde_json::to_value(StatsResponse {
            total_records: 3,
            total_companies: 3,
            total_uw: 5,
            last_updated: None,
        })
        .unwrap();
        assert_eq!(json["totalRecords"], 3);
        assert_eq!(json["totalUW"], 5);
        assert!(json["lastUpdated"].is_null());
    }

    #[test]
    fn test_underwriter_stat_no_data_is_null() {
        let stat = UnderwriterStat::new(
            "GT".to_string(),
            [Some(0.15), None, None, None, None, None, None],
            2,
            Some(0.15),
            1.0,
        );
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["avgReturnD1"], 0.15);
        assert!(json["avgReturnD2"].is_null());
        assert_eq!(json["totalDeals"], 2);
        assert_eq!(stat.window_averages()[0], Some(0.15));
    }
}
