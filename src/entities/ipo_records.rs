//! SeaORM Entity for IPO records
//!
//! One row per recorded listing. A stock code may appear on several rows when
//! its underwriters were captured separately.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ipo_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Stock ticker, uppercase (e.g., "GOTO")
    pub code: String,
    pub company_name: String,
    /// Underwriter codes as JSON array of uppercase strings
    #[sea_orm(column_type = "JsonBinary")]
    pub underwriters: Json,
    /// Legacy single underwriter from older imports
    pub uw: Option<String>,
    /// IPO price in IDR
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub ipo_price: Option<Decimal>,
    /// Board name as stored ("Main", "Development", "Acceleration")
    pub listing_board: Option<String>,
    pub listing_date: Option<Date>,
    /// Fractional return D+1..D+7 after listing (0.15 = +15%)
    pub return_d1: Option<f64>,
    pub return_d2: Option<f64>,
    pub return_d3: Option<f64>,
    pub return_d4: Option<f64>,
    pub return_d5: Option<f64>,
    pub return_d6: Option<f64>,
    pub return_d7: Option<f64>,
    /// Free-text annotation
    #[sea_orm(column_type = "Text", nullable)]
    pub record: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
