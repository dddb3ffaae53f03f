use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    EngineError, Journey, PayrollPosting, ResultEngine, Salary, SalaryAdjustmentKind,
    SalaryHistoryEntry, SalaryHistoryKind, SalaryUpdateCmd, payroll_postings, salaries,
    salary_history, util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// One change of `paid_minor` together with the history row it produces.
struct PaidChange<'a> {
    user_id: &'a str,
    kind: SalaryHistoryKind,
    delta: i64,
    journey_id: Option<Uuid>,
    note: Option<String>,
    created_by: &'a str,
}

impl Engine {
    /// Creates the zeroed salary row of `user_id` unless it already exists.
    async fn ensure_salary_row<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        salaries::Entity::insert(salaries::ActiveModel::empty(user_id, now))
            .on_conflict(
                OnConflict::column(salaries::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    async fn salary_model<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<salaries::Model> {
        salaries::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("salary not exists".to_string()))
    }

    /// Adds `change.delta` to the paid amount with a single
    /// `paid_minor = paid_minor + delta` statement and appends the matching
    /// history row.
    async fn apply_paid_change<C: ConnectionTrait>(
        &self,
        db: &C,
        change: PaidChange<'_>,
    ) -> ResultEngine<SalaryHistoryEntry> {
        let now = Utc::now();
        self.ensure_salary_row(db, change.user_id, now).await?;

        let current = self.salary_model(db, change.user_id).await?.paid_minor;
        if current.checked_add(change.delta).is_none() {
            return Err(EngineError::InvalidInput("amount overflow".to_string()));
        }

        salaries::Entity::update_many()
            .col_expr(
                salaries::Column::PaidMinor,
                Expr::col(salaries::Column::PaidMinor).add(change.delta),
            )
            .col_expr(salaries::Column::LastUpdated, Expr::value(now))
            .filter(salaries::Column::UserId.eq(change.user_id))
            .exec(db)
            .await?;

        let paid_after = self.salary_model(db, change.user_id).await?.paid_minor;
        let paid_before = paid_after
            .checked_sub(change.delta)
            .ok_or_else(|| EngineError::InvalidInput("amount overflow".to_string()))?;

        let entry = SalaryHistoryEntry {
            id: Uuid::new_v4(),
            user_id: change.user_id.to_string(),
            kind: change.kind,
            amount_minor: change.delta,
            paid_before_minor: paid_before,
            paid_after_minor: paid_after,
            journey_id: change.journey_id,
            note: change.note,
            created_by: change.created_by.to_string(),
            created_at: now,
        };
        salary_history::ActiveModel::from(&entry).insert(db).await?;
        Ok(entry)
    }

    /// Moves the deficit of a journey that just closed short into the
    /// driver's paid amount. Runs inside the end-of-journey transaction.
    pub(super) async fn apply_journey_deficit<C: ConnectionTrait>(
        &self,
        db: &C,
        journey: &Journey,
        deficit_minor: i64,
        created_by: &str,
    ) -> ResultEngine<SalaryHistoryEntry> {
        let entry = self
            .apply_paid_change(
                db,
                PaidChange {
                    user_id: &journey.driver_id,
                    kind: SalaryHistoryKind::JourneyAdjustment,
                    delta: deficit_minor,
                    journey_id: Some(journey.id),
                    note: Some(format!("deficit of journey {}", journey.id)),
                    created_by,
                },
            )
            .await?;

        tracing::info!(
            driver = %journey.driver_id,
            journey_id = %journey.id,
            deficit = deficit_minor,
            paid_after = entry.paid_after_minor,
            "journey deficit moved to payroll"
        );
        Ok(entry)
    }

    /// Replaces the driver's refund posting of the current period.
    async fn upsert_refund_posting<C: ConnectionTrait>(
        &self,
        db: &C,
        driver_id: &str,
        amount_minor: i64,
        note: Option<String>,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let mut stale = payroll_postings::Entity::delete_many()
            .filter(payroll_postings::Column::DriverId.eq(driver_id))
            .filter(
                payroll_postings::Column::Kind.eq(payroll_postings::kind_as_str(
                    SalaryAdjustmentKind::SalaryRefund,
                )),
            );
        if let Some(period_start) = self.current_period_start(db).await? {
            stale = stale.filter(payroll_postings::Column::CreatedAt.gt(period_start));
        }
        stale.exec(db).await?;

        let posting = PayrollPosting {
            id: Uuid::new_v4(),
            driver_id: driver_id.to_string(),
            kind: SalaryAdjustmentKind::SalaryRefund,
            amount_minor,
            note,
            created_by: created_by.to_string(),
            created_at: now,
        };
        payroll_postings::ActiveModel::from(&posting)
            .insert(db)
            .await?;
        Ok(())
    }

    /// Administrative salary edit.
    ///
    /// Order: entitlement, absolute paid correction, then each entry. Every
    /// change of the paid amount writes one history row and every deduction
    /// replaces the driver's refund posting for the current period.
    pub async fn update_salary(&self, cmd: SalaryUpdateCmd) -> ResultEngine<Salary> {
        if cmd.salary_minor.is_some_and(|salary| salary < 0) {
            return Err(EngineError::InvalidInput(
                "salary amount must be >= 0".to_string(),
            ));
        }

        let now = Utc::now();
        let salary = with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, &cmd.user_id).await?;
            let target = self.require_user(&db_tx, &cmd.target_user_id).await?;
            self.ensure_salary_row(&db_tx, &target.username, now).await?;

            if let Some(salary_minor) = cmd.salary_minor {
                salaries::ActiveModel {
                    user_id: ActiveValue::Set(target.username.clone()),
                    salary_minor: ActiveValue::Set(salary_minor),
                    last_updated: ActiveValue::Set(now),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }

            let mut changes = Vec::new();
            if let Some(paid_minor) = cmd.paid_minor {
                let current = self.salary_model(&db_tx, &target.username).await?.paid_minor;
                let delta = paid_minor
                    .checked_sub(current)
                    .ok_or_else(|| EngineError::InvalidInput("amount overflow".to_string()))?;
                if delta != 0 {
                    changes.push((delta, Some("paid amount correction".to_string())));
                }
            }
            for entry in cmd.entries.iter().filter(|entry| entry.amount_minor != 0) {
                changes.push((
                    entry.amount_minor,
                    normalize_optional_text(entry.note.as_deref()),
                ));
            }

            for (delta, note) in changes {
                let kind = SalaryHistoryKind::for_entry(delta);
                let entry = self
                    .apply_paid_change(
                        &db_tx,
                        PaidChange {
                            user_id: &target.username,
                            kind,
                            delta,
                            journey_id: None,
                            note: note.clone(),
                            created_by: &admin.username,
                        },
                    )
                    .await?;
                if kind == SalaryHistoryKind::Deduction {
                    self.upsert_refund_posting(
                        &db_tx,
                        &target.username,
                        entry.amount_minor.checked_neg().ok_or_else(|| {
                            EngineError::InvalidInput("amount overflow".to_string())
                        })?,
                        note,
                        &admin.username,
                        now,
                    )
                    .await?;
                }
            }

            Ok(Salary::from(
                self.salary_model(&db_tx, &target.username).await?,
            ))
        })?;

        tracing::info!(
            user = %salary.user_id,
            salary = salary.salary_minor,
            paid = salary.paid_minor,
            "salary updated"
        );
        Ok(salary)
    }

    /// Pays out the outstanding balance of `target_user_id`.
    ///
    /// A positive balance is booked as a `salary` payroll posting; the paid
    /// amount is then reset to 0 with a `payout` history row.
    pub async fn payout_salary(&self, target_user_id: &str, user_id: &str) -> ResultEngine<Salary> {
        let now = Utc::now();
        let salary = with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, user_id).await?;
            let target = self.require_user(&db_tx, target_user_id).await?;
            self.ensure_salary_row(&db_tx, &target.username, now).await?;

            let current = Salary::from(self.salary_model(&db_tx, &target.username).await?);
            let outstanding = current.balance_minor()?;
            if outstanding > 0 {
                let posting = PayrollPosting {
                    id: Uuid::new_v4(),
                    driver_id: target.username.clone(),
                    kind: SalaryAdjustmentKind::Salary,
                    amount_minor: outstanding,
                    note: Some("salary payout".to_string()),
                    created_by: admin.username.clone(),
                    created_at: now,
                };
                payroll_postings::ActiveModel::from(&posting)
                    .insert(&db_tx)
                    .await?;
            }

            if current.paid_minor != 0 {
                self.apply_paid_change(
                    &db_tx,
                    PaidChange {
                        user_id: &target.username,
                        kind: SalaryHistoryKind::Payout,
                        delta: current.paid_minor.checked_neg().ok_or_else(|| {
                            EngineError::InvalidInput("amount overflow".to_string())
                        })?,
                        journey_id: None,
                        note: Some("salary payout".to_string()),
                        created_by: &admin.username,
                    },
                )
                .await?;
            }

            tracing::info!(user = %target.username, outstanding, "salary paid out");
            Ok(Salary::from(
                self.salary_model(&db_tx, &target.username).await?,
            ))
        })?;
        Ok(salary)
    }

    /// Current salary of `target_user_id`. Users without a salary row read
    /// as all zeros.
    pub async fn salary(&self, target_user_id: &str, user_id: &str) -> ResultEngine<Salary> {
        let caller = self.require_caller(&self.database, user_id).await?;
        self.require_self_or_admin(&caller, target_user_id)?;
        let target = self.require_user(&self.database, target_user_id).await?;

        Ok(salaries::Entity::find_by_id(target.username.clone())
            .one(&self.database)
            .await?
            .map(Salary::from)
            .unwrap_or(Salary {
                user_id: target.username,
                salary_minor: 0,
                paid_minor: 0,
                last_updated: target.created_at,
            }))
    }

    /// Salary history of `target_user_id`, newest first.
    pub async fn salary_history(
        &self,
        target_user_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<SalaryHistoryEntry>> {
        let caller = self.require_caller(&self.database, user_id).await?;
        self.require_self_or_admin(&caller, target_user_id)?;
        self.require_user(&self.database, target_user_id).await?;

        salary_history::Entity::find()
            .filter(salary_history::Column::UserId.eq(target_user_id))
            .order_by_desc(salary_history::Column::CreatedAt)
            .order_by_desc(salary_history::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SalaryHistoryEntry::try_from)
            .collect()
    }

    /// Payroll postings booked since the last financial reset.
    pub(super) async fn current_period_postings<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Vec<PayrollPosting>> {
        let mut query = payroll_postings::Entity::find();
        if let Some(period_start) = self.current_period_start(db).await? {
            query = query.filter(payroll_postings::Column::CreatedAt.gt(period_start));
        }
        query
            .order_by_asc(payroll_postings::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(PayrollPosting::try_from)
            .collect()
    }
}
