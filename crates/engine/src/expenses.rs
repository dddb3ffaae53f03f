//! Expense log primitives.
//!
//! An `Expense` is one immutable cash event against a journey. Rows are only
//! ever inserted; a wrong amount is corrected by appending an offsetting
//! entry of the same category.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryAdjustmentKind {
    Salary,
    SalaryRefund,
}

/// Category of an expense.
///
/// The stored form is a string tag; anything that is not one of the reserved
/// tags is a regular spending category (fuel, toll, loading, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExpenseKind {
    Regular(String),
    TopUp,
    HydInward,
    /// Zero-amount annotation written by the system.
    System,
    SalaryAdjustment(SalaryAdjustmentKind),
}

impl ExpenseKind {
    /// Parses a user supplied tag.
    ///
    /// Tags are NFKC-normalized, trimmed and lowercased. Reserved tags are
    /// matched ignoring `_`, `-` and spaces, so `topUp`, `top_up` and
    /// `Top Up` all name the same category.
    pub fn parse(raw: &str) -> ResultEngine<Self> {
        let normalized: String = raw.nfkc().collect::<String>().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(EngineError::InvalidInput(
                "expense type must not be empty".to_string(),
            ));
        }
        let key: String = normalized
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        Ok(match key.as_str() {
            "topup" => Self::TopUp,
            "hydinward" => Self::HydInward,
            "system" => Self::System,
            "salary" => Self::SalaryAdjustment(SalaryAdjustmentKind::Salary),
            "salaryrefund" => Self::SalaryAdjustment(SalaryAdjustmentKind::SalaryRefund),
            _ => Self::Regular(normalized),
        })
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Self::Regular(tag) => tag.as_str(),
            Self::TopUp => "topUp",
            Self::HydInward => "hydInward",
            Self::System => "system",
            Self::SalaryAdjustment(SalaryAdjustmentKind::Salary) => "salary",
            Self::SalaryAdjustment(SalaryAdjustmentKind::SalaryRefund) => "salary_refund",
        }
    }
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl TryFrom<String> for ExpenseKind {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExpenseKind> for String {
    fn from(value: ExpenseKind) -> Self {
        value.as_tag().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub journey_id: Uuid,
    pub kind: ExpenseKind,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub created_by: String,
    pub occurred_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a new expense, enforcing the per-category amount rules:
    /// `system` annotations carry no money, every other category needs a
    /// non-zero amount (negative amounts are offsetting corrections).
    pub fn new(
        journey_id: Uuid,
        kind: ExpenseKind,
        amount_minor: i64,
        note: Option<String>,
        created_by: String,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        match kind {
            ExpenseKind::System if amount_minor != 0 => {
                return Err(EngineError::InvalidInput(
                    "system entries must have a zero amount".to_string(),
                ));
            }
            ExpenseKind::System => {}
            _ if amount_minor == 0 => {
                return Err(EngineError::InvalidInput(
                    "amount must not be 0".to_string(),
                ));
            }
            _ => {}
        }
        Ok(Self {
            id: Uuid::new_v4(),
            journey_id,
            kind,
            amount_minor,
            note,
            created_by,
            occurred_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub journey_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub created_by: String,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journeys::Entity",
        from = "Column::JourneyId",
        to = "super::journeys::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Journeys,
}

impl Related<super::journeys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journeys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            journey_id: ActiveValue::Set(expense.journey_id.to_string()),
            kind: ActiveValue::Set(expense.kind.as_tag().to_string()),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            note: ActiveValue::Set(expense.note.clone()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            occurred_at: ActiveValue::Set(expense.occurred_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            journey_id: parse_uuid(&model.journey_id, "journey")?,
            kind: ExpenseKind::parse(&model.kind)?,
            amount_minor: model.amount_minor,
            note: model.note,
            created_by: model.created_by,
            occurred_at: model.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_tags_ignore_case_and_separators() {
        assert_eq!(ExpenseKind::parse("topUp").unwrap(), ExpenseKind::TopUp);
        assert_eq!(ExpenseKind::parse(" TOP_UP ").unwrap(), ExpenseKind::TopUp);
        assert_eq!(ExpenseKind::parse("hydInward").unwrap(), ExpenseKind::HydInward);
        assert_eq!(ExpenseKind::parse("hyd-inward").unwrap(), ExpenseKind::HydInward);
        assert_eq!(
            ExpenseKind::parse("salary_refund").unwrap(),
            ExpenseKind::SalaryAdjustment(SalaryAdjustmentKind::SalaryRefund)
        );
    }

    #[test]
    fn other_tags_are_regular_and_normalized() {
        assert_eq!(
            ExpenseKind::parse("  Fuel ").unwrap(),
            ExpenseKind::Regular("fuel".to_string())
        );
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(
            ExpenseKind::parse("ＴＯＬＬ").unwrap(),
            ExpenseKind::Regular("toll".to_string())
        );
    }

    #[test]
    fn empty_tag_is_invalid() {
        assert!(matches!(
            ExpenseKind::parse("   "),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn tags_survive_storage() {
        for kind in [
            ExpenseKind::Regular("loading".to_string()),
            ExpenseKind::TopUp,
            ExpenseKind::HydInward,
            ExpenseKind::System,
            ExpenseKind::SalaryAdjustment(SalaryAdjustmentKind::Salary),
        ] {
            assert_eq!(ExpenseKind::parse(kind.as_tag()).unwrap(), kind);
        }
    }

    #[test]
    fn amount_rules_per_category() {
        let journey_id = Uuid::new_v4();
        let new = |kind, amount| {
            Expense::new(journey_id, kind, amount, None, "ravi".into(), Utc::now())
        };

        assert!(new(ExpenseKind::System, 0).is_ok());
        assert!(new(ExpenseKind::System, 10).is_err());
        assert!(new(ExpenseKind::Regular("fuel".into()), 0).is_err());
        assert!(new(ExpenseKind::Regular("fuel".into()), -200).is_ok());
        assert!(new(ExpenseKind::TopUp, 2_000).is_ok());
    }
}
