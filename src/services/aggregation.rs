//! In-memory aggregation over IPO records
//!
//! Pure functions used by the listing and statistics endpoints:
//!
//! - [`filter`] selects records by stock or underwriter search
//! - [`group`] collapses rows sharing a stock code into one entry
//! - [`compute_underwriter_stats`] and [`rank`] build the performance table
//!
//! None of these fail: empty input yields empty output.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::query::SearchMode;
use crate::models::record::{GroupedRecord, IpoRecord, RETURN_WINDOWS};
use crate::models::stats::{StatsResponse, UnderwriterCount, UnderwriterStat};

/// Options for [`group`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupOptions {
    /// Cap on the number of groups, applied after grouping and sorting
    pub limit: Option<usize>,
}

/// Whether a single record matches `term` under `mode`.
///
/// `term` must already be trimmed and non-empty.
pub fn matches(record: &IpoRecord, term: &str, mode: SearchMode) -> bool {
    match mode {
        SearchMode::Stock => {
            let needle = term.to_lowercase();
            record.code.to_lowercase().contains(&needle)
                || record.company_name.to_lowercase().contains(&needle)
        }
        SearchMode::Underwriter => {
            let needle = term.to_uppercase();
            record.resolved_underwriters().iter().any(|uw| *uw == needle)
        }
    }
}

/// Keep the records matching `term`. An empty term keeps everything.
pub fn filter(records: Vec<IpoRecord>, term: &str, mode: SearchMode) -> Vec<IpoRecord> {
    let term = term.trim();
    if term.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| matches(record, term, mode))
        .collect()
}

/// Sort newest listing first; undated records go last. Stable.
pub fn sort_by_listing_date(records: &mut [IpoRecord]) {
    records.sort_by(|a, b| b.listing_date.cmp(&a.listing_date));
}

/// Number of distinct stock codes
pub fn distinct_codes(records: &[IpoRecord]) -> usize {
    records
        .iter()
        .map(IpoRecord::group_key)
        .collect::<HashSet<_>>()
        .len()
}

/// Collapse records sharing a stock code.
///
/// The first row seen for a code supplies the scalar fields; underwriters
/// accumulate as a union in first-seen order. Output is ordered by listing
/// date descending and only then truncated to `opts.limit`.
pub fn group(records: Vec<IpoRecord>, opts: GroupOptions) -> Vec<GroupedRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupedRecord> = Vec::new();

    for record in records {
        let key = record.group_key();
        let underwriters = record.resolved_underwriters();

        match index.get(&key) {
            Some(&pos) => {
                let group = &mut groups[pos];
                merge_underwriters(&mut group.record.underwriters, underwriters);
                group.merged_rows += 1;
            }
            None => {
                index.insert(key.clone(), groups.len());
                let mut record = record;
                record.code = key;
                record.underwriters = underwriters;
                groups.push(GroupedRecord {
                    record,
                    merged_rows: 1,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.record.listing_date.cmp(&a.record.listing_date));

    if let Some(limit) = opts.limit {
        groups.truncate(limit);
    }
    groups
}

fn merge_underwriters(target: &mut Vec<String>, incoming: Vec<String>) {
    for uw in incoming {
        if !target.contains(&uw) {
            target.push(uw);
        }
    }
}

/// Mean of the observed returns of one deal
fn deal_average(returns: &[Option<f64>; RETURN_WINDOWS]) -> Option<f64> {
    let observed: Vec<f64> = returns.iter().flatten().copied().collect();
    if observed.is_empty() {
        None
    } else {
        Some(observed.iter().sum::<f64>() / observed.len() as f64)
    }
}

#[derive(Default)]
struct Accumulator {
    codes: HashSet<String>,
    sums: [f64; RETURN_WINDOWS],
    counts: [usize; RETURN_WINDOWS],
    positive_deals: usize,
}

impl Accumulator {
    fn finish(self, code: String) -> UnderwriterStat {
        let mut averages = [None; RETURN_WINDOWS];
        for (window, average) in averages.iter_mut().enumerate() {
            if self.counts[window] > 0 {
                *average = Some(self.sums[window] / self.counts[window] as f64);
            }
        }

        let with_data: Vec<f64> = averages.iter().flatten().copied().collect();
        let overall = if with_data.is_empty() {
            None
        } else {
            Some(with_data.iter().sum::<f64>() / with_data.len() as f64)
        };

        let deals = self.codes.len();
        let success_rate = if deals > 0 {
            self.positive_deals as f64 / deals as f64
        } else {
            0.0
        };

        UnderwriterStat::new(code, averages, deals, overall, success_rate)
    }
}

/// Per-underwriter return statistics.
///
/// A deal is one (underwriter, stock code) pair; repeated rows for the same
/// pair count once, using the first row seen. Output keeps the order in which
/// underwriters first appear.
pub fn compute_underwriter_stats(records: &[IpoRecord]) -> Vec<UnderwriterStat> {
    let mut order: Vec<String> = Vec::new();
    let mut accumulators: HashMap<String, Accumulator> = HashMap::new();

    for record in records {
        let code = record.group_key();
        let returns = record.returns();
        let positive = deal_average(&returns).is_some_and(|avg| avg > 0.0);

        for uw in record.resolved_underwriters() {
            let acc = accumulators.entry(uw.clone()).or_insert_with(|| {
                order.push(uw.clone());
                Accumulator::default()
            });

            if !acc.codes.insert(code.clone()) {
                continue;
            }
            for (window, value) in returns.iter().enumerate() {
                if let Some(value) = value {
                    acc.sums[window] += value;
                    acc.counts[window] += 1;
                }
            }
            if positive {
                acc.positive_deals += 1;
            }
        }
    }

    order
        .into_iter()
        .filter_map(|uw| accumulators.remove(&uw).map(|acc| acc.finish(uw)))
        .collect()
}

fn compare_overall_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Drop underwriters below `min_deals` and sort by overall average return,
/// best first. Underwriters without any data go last; ties keep input order.
pub fn rank(stats: Vec<UnderwriterStat>, min_deals: usize) -> Vec<UnderwriterStat> {
    let mut ranked: Vec<UnderwriterStat> = stats
        .into_iter()
        .filter(|stat| stat.total_deals >= min_deals)
        .collect();
    ranked.sort_by(|a, b| compare_overall_desc(a.avg_return_overall, b.avg_return_overall));
    ranked
}

/// Deals per underwriter, most active first
pub fn underwriter_deal_counts(records: &[IpoRecord]) -> Vec<UnderwriterCount> {
    let mut order: Vec<String> = Vec::new();
    let mut deals: HashMap<String, HashSet<String>> = HashMap::new();

    for record in records {
        let code = record.group_key();
        for uw in record.resolved_underwriters() {
            deals
                .entry(uw.clone())
                .or_insert_with(|| {
                    order.push(uw.clone());
                    HashSet::new()
                })
                .insert(code.clone());
        }
    }

    let mut counts: Vec<UnderwriterCount> = order
        .into_iter()
        .map(|code| {
            let count = deals.get(&code).map_or(0, HashSet::len);
            UnderwriterCount {
                code,
                ipo_count: count,
                total_ipos: count,
            }
        })
        .collect();
    counts.sort_by(|a, b| b.ipo_count.cmp(&a.ipo_count));
    counts
}

/// Dataset-wide totals
pub fn summarize(records: &[IpoRecord]) -> StatsResponse {
    let companies: HashSet<String> = records
        .iter()
        .map(|r| r.company_name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    let underwriters: HashSet<String> = records
        .iter()
        .flat_map(IpoRecord::resolved_underwriters)
        .collect();

    StatsResponse {
        total_records: distinct_codes(records),
        total_companies: companies.len(),
        total_uw: underwriters.len(),
        last_updated: records.iter().filter_map(|r| r.updated_at).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(code: &str, underwriters: &[&str]) -> IpoRecord {
        IpoRecord {
            code: code.to_string(),
            company_name: format!("{} Tbk", code),
            underwriters: underwriters.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn dated(code: &str, underwriters: &[&str], date: &str) -> IpoRecord {
        IpoRecord {
            listing_date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
            ..record(code, underwriters)
        }
    }

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-9)
    }

    #[test]
    fn test_group_merges_underwriters_of_same_code() {
        let mut first = record("AAA", &["X"]);
        first.return_d1 = Some(0.1);
        let mut second = record("AAA", &["Y"]);
        second.return_d1 = Some(0.1);

        let grouped = group(vec![first, second], GroupOptions::default());

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].record.code, "AAA");
        assert_eq!(grouped[0].record.underwriters, vec!["X", "Y"]);
        assert_eq!(grouped[0].merged_rows, 2);
    }

    #[test]
    fn test_group_union_collapses_duplicates() {
        let rows = vec![
            record("X1", &["A", "B"]),
            record("X1", &["b", "C"]),
            record("X1", &["A"]),
        ];
        let grouped = group(rows, GroupOptions::default());
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].record.underwriters, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_group_keeps_first_row_scalars() {
        let mut first = record("AAA", &["X"]);
        first.company_name = "First Name".to_string();
        first.return_d3 = Some(0.3);
        let mut second = record("AAA", &["Y"]);
        second.company_name = "Second Name".to_string();
        second.return_d3 = Some(-0.9);

        let grouped = group(vec![first, second], GroupOptions::default());
        assert_eq!(grouped[0].record.company_name, "First Name");
        assert_eq!(grouped[0].record.return_d3, Some(0.3));
    }

    #[test]
    fn test_group_sorts_by_listing_date_desc_undated_last() {
        let rows = vec![
            record("NODATE", &["A"]),
            dated("OLD", &["A"], "2021-01-05"),
            dated("NEW", &["B"], "2024-06-10"),
        ];
        let grouped = group(rows, GroupOptions::default());
        let codes: Vec<&str> = grouped.iter().map(|g| g.record.code.as_str()).collect();
        assert_eq!(codes, vec!["NEW", "OLD", "NODATE"]);
    }

    #[test]
    fn test_group_limit_applies_after_grouping() {
        // The second AAA row sits beyond a naive two-row window
        let rows = vec![
            dated("AAA", &["X"], "2024-01-01"),
            dated("BBB", &["Z"], "2023-01-01"),
            dated("AAA", &["Y"], "2024-01-01"),
        ];
        let grouped = group(rows, GroupOptions { limit: Some(1) });
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].record.code, "AAA");
        assert_eq!(grouped[0].record.underwriters, vec!["X", "Y"]);
    }

    #[test]
    fn test_group_is_order_independent() {
        let rows = vec![
            dated("AAA", &["X"], "2024-01-01"),
            dated("BBB", &["Z"], "2023-01-01"),
            dated("AAA", &["Y", "W"], "2024-01-01"),
            dated("CCC", &["X"], "2022-01-01"),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let summarize = |groups: Vec<GroupedRecord>| {
            let mut out: Vec<(String, Vec<String>)> = groups
                .into_iter()
                .map(|g| {
                    let mut uws = g.record.underwriters;
                    uws.sort();
                    (g.record.code, uws)
                })
                .collect();
            out.sort();
            out
        };

        assert_eq!(
            summarize(group(rows, GroupOptions::default())),
            summarize(group(reversed, GroupOptions::default()))
        );
    }

    #[test]
    fn test_group_uses_legacy_underwriter() {
        let mut legacy = record("OLD", &[]);
        legacy.uw = Some("pp".to_string());
        let rows = vec![legacy, record("OLD", &["QQ"])];

        let grouped = group(rows, GroupOptions::default());
        assert_eq!(grouped[0].record.underwriters, vec!["PP", "QQ"]);
    }

    #[test]
    fn test_group_empty_input() {
        assert!(group(Vec::new(), GroupOptions { limit: Some(5) }).is_empty());
    }

    #[test]
    fn test_filter_underwriter_mode_is_exact() {
        let rows = vec![record("AAA", &["AH", "BC"]), record("BBB", &["AHX"])];
        let result = filter(rows, "ah", SearchMode::Underwriter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "AAA");
    }

    #[test]
    fn test_filter_stock_mode_matches_code_or_name() {
        let mut goto = record("GOTO", &["AH"]);
        goto.company_name = "GoTo Gojek Tokopedia".to_string();
        let mut bbri = record("BBRI", &["AH"]);
        bbri.company_name = "Bank Rakyat".to_string();

        let by_code = filter(vec![goto.clone(), bbri.clone()], "got", SearchMode::Stock);
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].code, "GOTO");

        let by_name = filter(vec![goto, bbri], "RAKYAT", SearchMode::Stock);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].code, "BBRI");
    }

    #[test]
    fn test_filter_empty_term_matches_all() {
        let rows = vec![record("AAA", &["X"]), record("BBB", &["Y"])];
        assert_eq!(filter(rows.clone(), "", SearchMode::Underwriter), rows);
        assert_eq!(filter(rows.clone(), "   ", SearchMode::Stock), rows);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = vec![
            record("AAA", &["AH", "BC"]),
            record("BBB", &["AHX"]),
            record("AHA", &["ZZ"]),
        ];
        for mode in [SearchMode::Stock, SearchMode::Underwriter] {
            let once = filter(rows.clone(), "ah", mode);
            let twice = filter(once.clone(), "ah", mode);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_stats_window_average_and_no_data() {
        let mut first = record("AAA", &["GT"]);
        first.return_d1 = Some(0.10);
        let mut second = record("BBB", &["GT"]);
        second.return_d1 = Some(0.20);

        let stats = compute_underwriter_stats(&[first, second]);
        assert_eq!(stats.len(), 1);
        let gt = &stats[0];
        assert_eq!(gt.code, "GT");
        assert_eq!(gt.total_deals, 2);
        assert!(approx(gt.avg_return_d1, 0.15));
        for window in &gt.window_averages()[1..] {
            assert_eq!(*window, None);
        }
        assert!(approx(gt.avg_return_overall, 0.15));
        assert!((gt.success_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_overall_is_mean_of_window_averages() {
        // D1 averages 0.1 over two deals, D2 is 0.4 from one deal
        let mut first = record("AAA", &["UW"]);
        first.return_d1 = Some(0.0);
        first.return_d2 = Some(0.4);
        let mut second = record("BBB", &["UW"]);
        second.return_d1 = Some(0.2);

        let stats = compute_underwriter_stats(&[first, second]);
        let uw = &stats[0];
        assert!(approx(uw.avg_return_d1, 0.1));
        assert!(approx(uw.avg_return_d2, 0.4));
        // (0.1 + 0.4) / 2, not (0.0 + 0.4 + 0.2) / 3
        assert!(approx(uw.avg_return_overall, 0.25));
    }

    #[test]
    fn test_stats_count_each_code_once_per_underwriter() {
        let mut first = record("AAA", &["X"]);
        first.return_d1 = Some(0.5);
        let mut duplicate = record("AAA", &["X", "Y"]);
        duplicate.return_d1 = Some(-0.5);

        let stats = compute_underwriter_stats(&[first, duplicate]);
        let x = stats.iter().find(|s| s.code == "X").unwrap();
        let y = stats.iter().find(|s| s.code == "Y").unwrap();

        assert_eq!(x.total_deals, 1);
        assert!(approx(x.avg_return_d1, 0.5));
        assert_eq!(y.total_deals, 1);
        assert!(approx(y.avg_return_d1, -0.5));
    }

    #[test]
    fn test_stats_success_rate_over_deals() {
        let mut winner = record("AAA", &["UW"]);
        winner.return_d1 = Some(0.3);
        winner.return_d2 = Some(-0.1);
        let mut loser = record("BBB", &["UW"]);
        loser.return_d1 = Some(-0.2);
        let no_data = record("CCC", &["UW"]);
        let mut flat = record("DDD", &["UW"]);
        flat.return_d1 = Some(0.0);

        let stats = compute_underwriter_stats(&[winner, loser, no_data, flat]);
        assert_eq!(stats[0].total_deals, 4);
        assert!((stats[0].success_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_stats_without_returns_report_no_data() {
        let stats = compute_underwriter_stats(&[record("AAA", &["NX"])]);
        assert_eq!(stats[0].avg_return_overall, None);
        assert!(stats[0].window_averages().iter().all(Option::is_none));
        assert_eq!(stats[0].success_rate, 0.0);
    }

    #[test]
    fn test_stats_empty_input() {
        assert!(compute_underwriter_stats(&[]).is_empty());
        assert!(rank(Vec::new(), 2).is_empty());
        assert!(underwriter_deal_counts(&[]).is_empty());
        assert_eq!(summarize(&[]), StatsResponse::default());
    }

    #[test]
    fn test_rank_orders_and_filters() {
        let mut rows = Vec::new();
        for (code, uw, ret) in [
            ("A1", "LOW", 0.01),
            ("A2", "LOW", 0.03),
            ("B1", "HIGH", 0.2),
            ("B2", "HIGH", 0.4),
            ("C1", "SOLO", 0.9),
            ("D1", "TIE", 0.02),
            ("D2", "TIE", 0.02),
        ] {
            let mut r = record(code, &[uw]);
            r.return_d1 = Some(ret);
            rows.push(r);
        }
        rows.push(record("E1", &["EMPTY"]));
        rows.push(record("E2", &["EMPTY"]));

        let stats = compute_underwriter_stats(&rows);

        let all: Vec<String> = rank(stats.clone(), 1).into_iter().map(|s| s.code).collect();
        assert_eq!(all, vec!["SOLO", "HIGH", "LOW", "TIE", "EMPTY"]);

        let established: Vec<String> = rank(stats, 2).into_iter().map(|s| s.code).collect();
        assert_eq!(established, vec!["HIGH", "LOW", "TIE", "EMPTY"]);
    }

    #[test]
    fn test_underwriter_deal_counts() {
        let rows = vec![
            record("AAA", &["X", "Y"]),
            record("AAA", &["X"]),
            record("BBB", &["X"]),
            record("CCC", &["Z"]),
        ];
        let counts = underwriter_deal_counts(&rows);
        assert_eq!(counts[0].code, "X");
        assert_eq!(counts[0].ipo_count, 2);
        assert_eq!(counts[0].total_ipos, 2);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_summarize() {
        let mut legacy = record("CCC", &[]);
        legacy.uw = Some("Z".to_string());
        let rows = vec![record("AAA", &["X", "Y"]), record("AAA", &["X"]), legacy];

        let stats = summarize(&rows);
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.total_companies, 2);
        assert_eq!(stats.total_uw, 3);
        assert_eq!(stats.last_updated, None);
    }
}
