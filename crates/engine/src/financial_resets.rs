//! Audit rows for the financial reset (archival) runs. The latest run marks
//! the start of the current reporting period.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialReset {
    pub id: Uuid,
    pub run_at: DateTime<Utc>,
    pub run_by: String,
    pub archived_count: u64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "financial_resets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub run_at: DateTimeUtc,
    pub run_by: String,
    pub archived_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FinancialReset> for ActiveModel {
    fn from(reset: &FinancialReset) -> Self {
        Self {
            id: ActiveValue::Set(reset.id.to_string()),
            run_at: ActiveValue::Set(reset.run_at),
            run_by: ActiveValue::Set(reset.run_by.clone()),
            archived_count: ActiveValue::Set(i64::try_from(reset.archived_count).unwrap_or(i64::MAX)),
        }
    }
}
