//! Journey balance calculator.
//!
//! Balances are never stored: every read folds the full expense log of a
//! journey into a [`JourneyBalance`].
//!
//! ```text
//! working = pouch + top-ups - regular expenses
//! final   = working + (security deposit + HYD inward, once completed)
//! ```
//!
//! `system` annotations carry no money and payroll adjustments never belong
//! to a driver's journey balance.

use serde::{Deserialize, Serialize};

use crate::{Expense, ExpenseKind, Journey, Money, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyBalance {
    pub total_regular_minor: i64,
    pub total_top_up_minor: i64,
    pub total_hyd_inward_minor: i64,
    /// What the driver is accountable for while the journey runs.
    pub working_balance_minor: i64,
    /// Settlement figure. Equals the working balance until completion.
    pub final_balance_minor: i64,
}

#[derive(Default)]
struct Totals {
    regular: Money,
    top_up: Money,
    hyd_inward: Money,
}

fn totals<'a, I>(expenses: I) -> ResultEngine<Totals>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals = Totals::default();
    for expense in expenses {
        let amount = Money::new(expense.amount_minor);
        match &expense.kind {
            ExpenseKind::Regular(_) => totals.regular = totals.regular.checked_add(amount)?,
            ExpenseKind::TopUp => totals.top_up = totals.top_up.checked_add(amount)?,
            ExpenseKind::HydInward => totals.hyd_inward = totals.hyd_inward.checked_add(amount)?,
            ExpenseKind::System | ExpenseKind::SalaryAdjustment(_) => {}
        }
    }
    Ok(totals)
}

impl JourneyBalance {
    /// Computes both balances of `journey` from its expense log.
    ///
    /// Expenses of other journeys must not be passed in; the caller loads
    /// the log by journey id.
    pub fn compute<'a, I>(journey: &Journey, expenses: I) -> ResultEngine<Self>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let totals = totals(expenses)?;

        let working = Money::new(journey.pouch_minor)
            .checked_add(totals.top_up)?
            .checked_sub(totals.regular)?;

        let final_balance = if journey.is_completed() {
            working
                .checked_add(Money::new(journey.security_deposit_minor))?
                .checked_add(totals.hyd_inward)?
        } else {
            working
        };

        Ok(Self {
            total_regular_minor: totals.regular.minor(),
            total_top_up_minor: totals.top_up.minor(),
            total_hyd_inward_minor: totals.hyd_inward.minor(),
            working_balance_minor: working.minor(),
            final_balance_minor: final_balance.minor(),
        })
    }

    /// Amount the driver owes when the journey closes, if any.
    pub fn deficit_minor(&self) -> Option<i64> {
        (self.working_balance_minor < 0).then(|| -self.working_balance_minor)
    }
}
