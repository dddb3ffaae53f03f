//! Company-level payroll bookkeeping.
//!
//! Salary payouts and deduction refunds affect company profit for the
//! current period but belong to no particular journey, so they are kept out
//! of the expense log entirely.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, SalaryAdjustmentKind, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPosting {
    pub id: Uuid,
    pub driver_id: String,
    pub kind: SalaryAdjustmentKind,
    /// Always positive; the kind decides whether it is a cost or a recovery.
    pub amount_minor: i64,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn kind_as_str(kind: SalaryAdjustmentKind) -> &'static str {
    match kind {
        SalaryAdjustmentKind::Salary => "salary",
        SalaryAdjustmentKind::SalaryRefund => "salary_refund",
    }
}

fn kind_from_str(value: &str) -> Result<SalaryAdjustmentKind, EngineError> {
    match value {
        "salary" => Ok(SalaryAdjustmentKind::Salary),
        "salary_refund" => Ok(SalaryAdjustmentKind::SalaryRefund),
        other => Err(EngineError::InvalidInput(format!(
            "invalid payroll posting kind: {other}"
        ))),
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payroll_postings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub driver_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PayrollPosting> for ActiveModel {
    fn from(posting: &PayrollPosting) -> Self {
        Self {
            id: ActiveValue::Set(posting.id.to_string()),
            driver_id: ActiveValue::Set(posting.driver_id.clone()),
            kind: ActiveValue::Set(kind_as_str(posting.kind).to_string()),
            amount_minor: ActiveValue::Set(posting.amount_minor),
            note: ActiveValue::Set(posting.note.clone()),
            created_by: ActiveValue::Set(posting.created_by.clone()),
            created_at: ActiveValue::Set(posting.created_at),
        }
    }
}

impl TryFrom<Model> for PayrollPosting {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payroll posting")?,
            kind: kind_from_str(model.kind.as_str())?,
            driver_id: model.driver_id,
            amount_minor: model.amount_minor,
            note: model.note,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
