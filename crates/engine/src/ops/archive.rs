use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*,
    sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{FinancialReset, JourneyStatus, ResultEngine, financial_resets, journeys};

use super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveOutcome {
    pub archived_count: u64,
}

impl Engine {
    /// Start of the current reporting period: the time of the latest
    /// financial reset, or `None` before the first one.
    pub(super) async fn current_period_start<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Option<DateTime<Utc>>> {
        Ok(financial_resets::Entity::find()
            .order_by_desc(financial_resets::Column::RunAt)
            .limit(1)
            .one(db)
            .await?
            .map(|reset| reset.run_at))
    }

    /// Archives every completed journey that is not archived yet.
    ///
    /// Each journey is flipped on its own with a conditional update, so one
    /// failing row does not stop the others and a second run archives
    /// nothing. Active journeys are never touched.
    pub async fn archive_completed_journeys(&self, user_id: &str) -> ResultEngine<ArchiveOutcome> {
        let admin = self.require_admin(&self.database, user_id).await?;

        let candidates: Vec<String> = journeys::Entity::find()
            .select_only()
            .column(journeys::Column::Id)
            .filter(journeys::Column::Status.eq(JourneyStatus::Completed.as_str()))
            .filter(journeys::Column::Archived.eq(false))
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut archived_count = 0u64;
        for journey_id in candidates {
            let flipped = journeys::Entity::update_many()
                .col_expr(journeys::Column::Archived, Expr::value(true))
                .filter(journeys::Column::Id.eq(journey_id.clone()))
                .filter(journeys::Column::Status.eq(JourneyStatus::Completed.as_str()))
                .filter(journeys::Column::Archived.eq(false))
                .exec(&self.database)
                .await;
            match flipped {
                Ok(result) => archived_count += result.rows_affected,
                Err(err) => {
                    tracing::warn!(journey_id = %journey_id, error = %err, "failed to archive journey");
                }
            }
        }

        let reset = FinancialReset {
            id: Uuid::new_v4(),
            run_at: Utc::now(),
            run_by: admin.username,
            archived_count,
        };
        financial_resets::ActiveModel::from(&reset)
            .insert(&self.database)
            .await?;

        tracing::info!(archived_count, run_by = %reset.run_by, "financial data reset");
        Ok(ArchiveOutcome { archived_count })
    }
}
