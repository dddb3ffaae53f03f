use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCmd, ExpenseKind, ResultEngine, expenses,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Appends one cash event to a journey's log.
    ///
    /// Drivers append to their own active journeys. Admins may also append
    /// corrections to completed journeys until they are archived.
    pub async fn append_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let kind = ExpenseKind::parse(&cmd.kind)?;
        if matches!(kind, ExpenseKind::SalaryAdjustment(_)) {
            return Err(EngineError::InvalidInput(format!(
                "{kind} entries are reserved for payroll"
            )));
        }

        let expense = with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, &cmd.user_id).await?;
            let journey = self
                .require_journey_access(&db_tx, cmd.journey_id, &caller)
                .await?;
            if journey.archived {
                return Err(EngineError::InvalidState(
                    "journey is archived".to_string(),
                ));
            }
            if !journey.is_active() && !caller.is_admin() {
                return Err(EngineError::InvalidState(
                    "journey is not active".to_string(),
                ));
            }

            let expense = Expense::new(
                journey.id,
                kind.clone(),
                cmd.amount_minor,
                normalize_optional_text(cmd.note.as_deref()),
                caller.username.clone(),
                cmd.occurred_at,
            )?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            Ok(expense)
        })?;

        tracing::debug!(
            journey_id = %expense.journey_id,
            kind = %expense.kind,
            amount = expense.amount_minor,
            "expense appended"
        );
        Ok(expense)
    }

    /// Expense log of a journey, newest first.
    pub async fn expenses(&self, journey_id: Uuid, user_id: &str) -> ResultEngine<Vec<Expense>> {
        let caller = self.require_caller(&self.database, user_id).await?;
        self.require_journey_access(&self.database, journey_id, &caller)
            .await?;
        let mut log = self.expenses_ascending(&self.database, journey_id).await?;
        log.reverse();
        Ok(log)
    }
}
