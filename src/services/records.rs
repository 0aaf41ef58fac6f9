//! Record Service
//!
//! Store access for IPO records. Search terms are narrowed at the query layer
//! and then re-checked with the in-memory predicate, which has the final say.

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, warn};

use crate::entities::{ipo_records, prelude::IpoRecords};
use crate::error::AppError;
use crate::models::query::{
    GroupedRecordsQuery, PerformanceQuery, RecordsQuery, SearchMode,
};
use crate::models::record::{BulkCreateResponse, CreateRecordRequest, GroupedRecord, IpoRecord};
use crate::models::stats::{StatsResponse, UnderwriterCount, UnderwriterStat};
use crate::services::aggregation::{self, GroupOptions};
use crate::services::validation::{validate_create, NewRecord, RecordChanges};

/// Record service over the `ipo_records` table
#[derive(Clone, Default)]
pub struct RecordService;

impl RecordService {
    pub fn new() -> Self {
        Self
    }

    /// Rows matching the search, sorted newest listing first.
    pub async fn fetch_matching(
        &self,
        db: &DatabaseConnection,
        search: Option<&str>,
        mode: SearchMode,
    ) -> Result<Vec<IpoRecord>, AppError> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());

        let mut select = IpoRecords::find();
        if let Some(term) = term {
            select = match mode {
                SearchMode::Stock => {
                    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
                    select.filter(
                        Condition::any()
                            .add(
                                Expr::expr(Func::lower(Expr::col(ipo_records::Column::Code)))
                                    .like(pattern.clone()),
                            )
                            .add(
                                Expr::expr(Func::lower(Expr::col(
                                    ipo_records::Column::CompanyName,
                                )))
                                .like(pattern),
                            ),
                    )
                }
                SearchMode::Underwriter => {
                    let upper = term.to_uppercase();
                    let needle = serde_json::json!([upper]).to_string();
                    select.filter(
                        Condition::any()
                            .add(Expr::cust_with_values(
                                "underwriters @> CAST(? AS jsonb)",
                                [needle],
                            ))
                            .add(
                                Expr::expr(Func::upper(Expr::col(ipo_records::Column::Uw)))
                                    .eq(upper),
                            ),
                    )
                }
            };
        }

        let models = select
            .order_by_asc(ipo_records::Column::Id)
            .all(db)
            .await?;
        debug!(rows = models.len(), "Fetched IPO records");

        let records: Vec<IpoRecord> = models.into_iter().map(IpoRecord::from).collect();
        let mut records = match term {
            Some(term) => aggregation::filter(records, term, mode),
            None => records,
        };
        aggregation::sort_by_listing_date(&mut records);
        Ok(records)
    }

    /// Paginated rows and the number of rows matching before pagination
    pub async fn list(
        &self,
        db: &DatabaseConnection,
        query: &RecordsQuery,
    ) -> Result<(Vec<IpoRecord>, usize), AppError> {
        let records = self
            .fetch_matching(db, query.search.as_deref(), query.mode())
            .await?;
        let total = records.len();

        let page = records
            .into_iter()
            .skip(query.effective_offset())
            .take(query.effective_limit())
            .collect();
        Ok((page, total))
    }

    /// Grouped listing and the number of groups before the limit
    pub async fn grouped(
        &self,
        db: &DatabaseConnection,
        query: &GroupedRecordsQuery,
    ) -> Result<(Vec<GroupedRecord>, usize), AppError> {
        let records = self
            .fetch_matching(db, query.search.as_deref(), query.mode())
            .await?;
        let total = aggregation::distinct_codes(&records);

        let grouped = aggregation::group(
            records,
            GroupOptions {
                limit: Some(query.effective_limit()),
            },
        );
        Ok((grouped, total))
    }

    pub async fn get(&self, db: &DatabaseConnection, id: i32) -> Result<IpoRecord, AppError> {
        IpoRecords::find_by_id(id)
            .one(db)
            .await?
            .map(IpoRecord::from)
            .ok_or_else(|| AppError::NotFound("Record".to_string()))
    }

    pub async fn create(
        &self,
        db: &DatabaseConnection,
        record: NewRecord,
    ) -> Result<IpoRecord, AppError> {
        let now = Utc::now().fixed_offset();
        let [d1, d2, d3, d4, d5, d6, d7] = record.returns;

        let model = ipo_records::ActiveModel {
            code: Set(record.code),
            company_name: Set(record.company_name),
            underwriters: Set(serde_json::json!(record.underwriters)),
            uw: Set(None),
            ipo_price: Set(record.ipo_price),
            listing_board: Set(record.listing_board.map(|b| b.as_str().to_string())),
            listing_date: Set(record.listing_date),
            return_d1: Set(d1),
            return_d2: Set(d2),
            return_d3: Set(d3),
            return_d4: Set(d4),
            return_d5: Set(d5),
            return_d6: Set(d6),
            return_d7: Set(d7),
            record: Set(record.record),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model.insert(db).await?;
        info!(id = inserted.id, code = %inserted.code, "Created IPO record");
        Ok(IpoRecord::from(inserted))
    }

    /// Insert each payload independently, collecting per-record failures
    pub async fn bulk_create(
        &self,
        db: &DatabaseConnection,
        requests: Vec<CreateRecordRequest>,
    ) -> BulkCreateResponse {
        let mut response = BulkCreateResponse::default();

        for (position, request) in requests.into_iter().enumerate() {
            let label = request
                .code
                .clone()
                .unwrap_or_else(|| format!("#{}", position + 1));

            let outcome = match validate_create(request) {
                Ok(record) => self.create(db, record).await.map(|_| ()),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => response.success += 1,
                Err(e) => {
                    let message = format!("Failed to create {}: {}", label, e);
                    warn!("{}", message);
                    response.failed += 1;
                    response.errors.push(message);
                }
            }
        }

        info!(
            success = response.success,
            failed = response.failed,
            "Bulk create completed"
        );
        response
    }

    /// Apply a partial update; untouched columns keep their values
    pub async fn update(
        &self,
        db: &DatabaseConnection,
        id: i32,
        changes: RecordChanges,
    ) -> Result<IpoRecord, AppError> {
        let existing = IpoRecords::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Record".to_string()))?;

        let mut active: ipo_records::ActiveModel = existing.into();
        if let Some(code) = changes.code {
            active.code = Set(code);
        }
        if let Some(company_name) = changes.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(underwriters) = changes.underwriters {
            active.underwriters = Set(serde_json::json!(underwriters));
        }
        if let Some(ipo_price) = changes.ipo_price {
            active.ipo_price = Set(ipo_price);
        }
        if let Some(board) = changes.listing_board {
            active.listing_board = Set(board.map(|b| b.as_str().to_string()));
        }
        if let Some(listing_date) = changes.listing_date {
            active.listing_date = Set(listing_date);
        }
        for (window, change) in changes.returns.into_iter().enumerate() {
            if let Some(value) = change {
                set_return(&mut active, window, value);
            }
        }
        if let Some(record) = changes.record {
            active.record = Set(record);
        }
        active.updated_at = Set(Utc::now().fixed_offset());

        let updated = active.update(db).await?;
        info!(id = updated.id, code = %updated.code, "Updated IPO record");
        Ok(IpoRecord::from(updated))
    }

    pub async fn delete(&self, db: &DatabaseConnection, id: i32) -> Result<(), AppError> {
        let result = IpoRecords::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Record".to_string()));
        }
        info!(id = id, "Deleted IPO record");
        Ok(())
    }

    pub async fn stats(&self, db: &DatabaseConnection) -> Result<StatsResponse, AppError> {
        let records = self.fetch_matching(db, None, SearchMode::default()).await?;
        Ok(aggregation::summarize(&records))
    }

    /// Deal counts per underwriter, optionally narrowed by a code substring
    pub async fn underwriter_counts(
        &self,
        db: &DatabaseConnection,
        search: Option<&str>,
    ) -> Result<Vec<UnderwriterCount>, AppError> {
        let records = self.fetch_matching(db, None, SearchMode::default()).await?;
        let counts = aggregation::underwriter_deal_counts(&records);

        let needle = search
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty());
        Ok(match needle {
            Some(needle) => counts
                .into_iter()
                .filter(|c| c.code.contains(&needle))
                .collect(),
            None => counts,
        })
    }

    /// Ranked performance over grouped records, with the count before `limit`
    pub async fn performance(
        &self,
        db: &DatabaseConnection,
        query: &PerformanceQuery,
    ) -> Result<(Vec<UnderwriterStat>, usize), AppError> {
        let records = self.fetch_matching(db, None, SearchMode::default()).await?;
        let grouped: Vec<IpoRecord> = aggregation::group(records, GroupOptions::default())
            .into_iter()
            .map(|g| g.record)
            .collect();

        let stats = aggregation::compute_underwriter_stats(&grouped);
        let mut ranked = aggregation::rank(stats, query.min_deals.unwrap_or(1));
        let total = ranked.len();
        if let Some(limit) = query.limit {
            ranked.truncate(limit);
        }
        Ok((ranked, total))
    }
}

/// Escape `LIKE` metacharacters; Postgres uses `\` as the default escape
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn set_return(active: &mut ipo_records::ActiveModel, window: usize, value: Option<f64>) {
    let slot = match window {
        0 => &mut active.return_d1,
        1 => &mut active.return_d2,
        2 => &mut active.return_d3,
        3 => &mut active.return_d4,
        4 => &mut active.return_d5,
        5 => &mut active.return_d6,
        6 => &mut active.return_d7,
        _ => return,
    };
    *slot = Set(value);
}
