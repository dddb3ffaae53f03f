use std::collections::HashMap;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Expense, Journey, JourneyBalance, Money, ResultEngine, SalaryAdjustmentKind, expenses,
    journeys,
};

use super::{Engine, with_tx};

/// Company figures for the current period (unarchived journeys and payroll
/// postings since the last reset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub active_journeys: u64,
    pub completed_journeys: u64,
    pub total_pouch_minor: i64,
    pub total_top_up_minor: i64,
    pub total_regular_minor: i64,
    pub total_hyd_inward_minor: i64,
    pub total_deficit_minor: i64,
    pub salary_payouts_minor: i64,
    pub salary_refunds_minor: i64,
    /// `hyd inward - regular - payouts + refunds`
    pub profit_minor: i64,
}

#[derive(Default)]
struct Accumulator {
    pouch: Money,
    top_up: Money,
    regular: Money,
    hyd_inward: Money,
    deficit: Money,
    payouts: Money,
    refunds: Money,
}

impl Engine {
    pub async fn period_summary(&self, user_id: &str) -> ResultEngine<PeriodSummary> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, user_id).await?;

            let open: Vec<Journey> = journeys::Entity::find()
                .filter(journeys::Column::Archived.eq(false))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Journey::try_from)
                .collect::<ResultEngine<_>>()?;

            let mut logs: HashMap<Uuid, Vec<Expense>> = HashMap::new();
            let ids: Vec<String> = open.iter().map(|j| j.id.to_string()).collect();
            if !ids.is_empty() {
                for model in expenses::Entity::find()
                    .filter(expenses::Column::JourneyId.is_in(ids))
                    .all(&db_tx)
                    .await?
                {
                    let expense = Expense::try_from(model)?;
                    logs.entry(expense.journey_id).or_default().push(expense);
                }
            }

            let mut summary = PeriodSummary::default();
            let mut acc = Accumulator::default();
            for journey in &open {
                if journey.is_active() {
                    summary.active_journeys += 1;
                } else {
                    summary.completed_journeys += 1;
                }
                let log = logs.get(&journey.id).map(Vec::as_slice).unwrap_or_default();
                let balance = JourneyBalance::compute(journey, log)?;

                acc.pouch = acc.pouch.checked_add(Money::new(journey.pouch_minor))?;
                acc.top_up = acc.top_up.checked_add(Money::new(balance.total_top_up_minor))?;
                acc.regular = acc
                    .regular
                    .checked_add(Money::new(balance.total_regular_minor))?;
                acc.hyd_inward = acc
                    .hyd_inward
                    .checked_add(Money::new(balance.total_hyd_inward_minor))?;
                if journey.is_completed()
                    && let Some(deficit) = balance.deficit_minor()
                {
                    acc.deficit = acc.deficit.checked_add(Money::new(deficit))?;
                }
            }

            for posting in self.current_period_postings(&db_tx).await? {
                let amount = Money::new(posting.amount_minor);
                match posting.kind {
                    SalaryAdjustmentKind::Salary => acc.payouts = acc.payouts.checked_add(amount)?,
                    SalaryAdjustmentKind::SalaryRefund => {
                        acc.refunds = acc.refunds.checked_add(amount)?
                    }
                }
            }

            let profit = acc
                .hyd_inward
                .checked_sub(acc.regular)?
                .checked_sub(acc.payouts)?
                .checked_add(acc.refunds)?;

            summary.total_pouch_minor = acc.pouch.minor();
            summary.total_top_up_minor = acc.top_up.minor();
            summary.total_regular_minor = acc.regular.minor();
            summary.total_hyd_inward_minor = acc.hyd_inward.minor();
            summary.total_deficit_minor = acc.deficit.minor();
            summary.salary_payouts_minor = acc.payouts.minor();
            summary.salary_refunds_minor = acc.refunds.minor();
            summary.profit_minor = profit.minor();
            Ok(summary)
        })
    }
}
