//! Append-only audit trail of every change to a salary's paid amount.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryHistoryKind {
    Payment,
    Deduction,
    JourneyAdjustment,
    Payout,
}

impl SalaryHistoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Deduction => "deduction",
            Self::JourneyAdjustment => "journey_adjustment",
            Self::Payout => "payout",
        }
    }

    /// Tag for an admin entry of the given signed amount.
    pub fn for_entry(amount_minor: i64) -> Self {
        if amount_minor < 0 {
            Self::Deduction
        } else {
            Self::Payment
        }
    }
}

impl TryFrom<&str> for SalaryHistoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payment" => Ok(Self::Payment),
            "deduction" => Ok(Self::Deduction),
            "journey_adjustment" => Ok(Self::JourneyAdjustment),
            "payout" => Ok(Self::Payout),
            other => Err(EngineError::InvalidInput(format!(
                "invalid salary history kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryHistoryEntry {
    pub id: Uuid,
    pub user_id: String,
    pub kind: SalaryHistoryKind,
    /// Signed change applied to `paid_minor`.
    pub amount_minor: i64,
    pub paid_before_minor: i64,
    pub paid_after_minor: i64,
    pub journey_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "salary_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub paid_before_minor: i64,
    pub paid_after_minor: i64,
    pub journey_id: Option<String>,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SalaryHistoryEntry> for ActiveModel {
    fn from(entry: &SalaryHistoryEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            user_id: ActiveValue::Set(entry.user_id.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            paid_before_minor: ActiveValue::Set(entry.paid_before_minor),
            paid_after_minor: ActiveValue::Set(entry.paid_after_minor),
            journey_id: ActiveValue::Set(entry.journey_id.map(|id| id.to_string())),
            note: ActiveValue::Set(entry.note.clone()),
            created_by: ActiveValue::Set(entry.created_by.clone()),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for SalaryHistoryEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "salary history")?,
            kind: SalaryHistoryKind::try_from(model.kind.as_str())?,
            journey_id: model
                .journey_id
                .as_deref()
                .map(|id| parse_uuid(id, "journey"))
                .transpose()?,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            paid_before_minor: model.paid_before_minor,
            paid_after_minor: model.paid_after_minor,
            note: model.note,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
