//! Current payroll state of a user.
//!
//! `paid_minor` accumulates everything already disbursed to the driver or
//! owed back by them (journey deficits). It is only ever changed through
//! atomic `paid_minor = paid_minor + delta` updates, see `ops::payroll`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salary {
    pub user_id: String,
    pub salary_minor: i64,
    pub paid_minor: i64,
    pub last_updated: DateTime<Utc>,
}

impl Salary {
    /// `salary - paid`: positive when the company owes the driver, negative
    /// when the driver owes the company.
    pub fn balance_minor(&self) -> ResultEngine<i64> {
        self.salary_minor
            .checked_sub(self.paid_minor)
            .ok_or_else(|| EngineError::InvalidInput("amount overflow".to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "salaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub salary_minor: i64,
    pub paid_minor: i64,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Salary {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            salary_minor: model.salary_minor,
            paid_minor: model.paid_minor,
            last_updated: model.last_updated,
        }
    }
}

impl ActiveModel {
    /// Zeroed row used when a user is touched by payroll for the first time.
    pub(crate) fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: ActiveValue::Set(user_id.to_string()),
            salary_minor: ActiveValue::Set(0),
            paid_minor: ActiveValue::Set(0),
            last_updated: ActiveValue::Set(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_can_go_negative() {
        let salary = Salary {
            user_id: "ravi".to_string(),
            salary_minor: 20_000,
            paid_minor: 25_000,
            last_updated: Utc::now(),
        };
        assert_eq!(salary.balance_minor().unwrap(), -5_000);
    }

    #[test]
    fn balance_overflow_is_invalid_input() {
        let salary = Salary {
            user_id: "ravi".to_string(),
            salary_minor: i64::MAX,
            paid_minor: -1,
            last_updated: Utc::now(),
        };
        assert!(matches!(
            salary.balance_minor(),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
