use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, Expense, Journey, JourneyBalance, JourneyListFilter, JourneyScope,
    JourneyStatus, Location, ResultEngine, Role, SalaryHistoryEntry, StartJourneyCmd, expenses,
    journeys,
    util::{normalize_optional_text, parse_uuid},
};

use super::{Engine, with_tx};

/// A journey together with its derived balances and its expense log
/// (newest first).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JourneyDetail {
    pub journey: Journey,
    pub balance: JourneyBalance,
    pub expenses: Vec<Expense>,
}

/// Result of ending a journey: the completed journey and, when the driver
/// came back short, the payroll adjustment written in the same transaction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JourneyClosing {
    pub journey: Journey,
    pub balance: JourneyBalance,
    pub adjustment: Option<SalaryHistoryEntry>,
}

/// Maps a hit on the active-journey unique index to `VehicleBusy`.
fn vehicle_busy_or(err: DbErr, vehicle_id: Uuid) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::VehicleBusy(vehicle_id.to_string())
        }
        _ => err.into(),
    }
}

impl Engine {
    pub(super) async fn expenses_ascending<C: ConnectionTrait>(
        &self,
        db: &C,
        journey_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::JourneyId.eq(journey_id.to_string()))
            .order_by_asc(expenses::Column::OccurredAt)
            .order_by_asc(expenses::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Starts a journey.
    ///
    /// The vehicle must not carry another active, unarchived journey. The
    /// check runs inside the insert transaction and is backed by a partial
    /// unique index, so of two racing starts exactly one commits and the
    /// other gets `VehicleBusy`.
    pub async fn start_journey(&self, cmd: StartJourneyCmd) -> ResultEngine<Journey> {
        let journey = Journey::new(
            cmd.driver_id.clone(),
            cmd.vehicle_id,
            normalize_optional_text(cmd.destination.as_deref()),
            cmd.pouch_minor,
            cmd.security_deposit_minor,
            cmd.started_at,
        )?;

        with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, &cmd.user_id).await?;
            if !caller.is_admin() && caller.username != cmd.driver_id {
                return Err(EngineError::Forbidden(
                    "drivers can only start their own journeys".to_string(),
                ));
            }

            let driver = self.require_user(&db_tx, &cmd.driver_id).await?;
            if driver.role != Role::Driver {
                return Err(EngineError::InvalidInput(format!(
                    "{} is not a driver",
                    driver.username
                )));
            }
            if !driver.is_active() {
                return Err(EngineError::InvalidState(format!(
                    "driver {} is deactivated",
                    driver.username
                )));
            }

            self.require_vehicle_model(&db_tx, &cmd.vehicle_id.to_string())
                .await?;
            if self
                .active_journey_on_vehicle(&db_tx, cmd.vehicle_id)
                .await?
                .is_some()
            {
                return Err(EngineError::VehicleBusy(cmd.vehicle_id.to_string()));
            }

            journeys::ActiveModel::from(&journey)
                .insert(&db_tx)
                .await
                .map_err(|err| vehicle_busy_or(err, cmd.vehicle_id))?;

            Ok(())
        })?;

        tracing::info!(
            journey_id = %journey.id,
            driver = %journey.driver_id,
            vehicle_id = %journey.vehicle_id,
            "journey started"
        );
        Ok(journey)
    }

    /// Ends an active journey and reconciles payroll in one transaction.
    ///
    /// The status flip is a conditional update on `status = 'active'`; if it
    /// does not hit exactly one row the whole unit fails with `InvalidState`
    /// and no salary write happens.
    pub async fn end_journey(&self, journey_id: Uuid, user_id: &str) -> ResultEngine<JourneyClosing> {
        let ended_at = Utc::now();
        let closing = with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, user_id).await?;
            let mut journey = self
                .require_journey_access(&db_tx, journey_id, &caller)
                .await?;
            if !journey.is_active() {
                return Err(EngineError::InvalidState(
                    "journey is not active".to_string(),
                ));
            }

            let log = self.expenses_ascending(&db_tx, journey_id).await?;
            journey.status = JourneyStatus::Completed;
            journey.end_time = Some(ended_at);
            let balance = JourneyBalance::compute(&journey, &log)?;

            let flipped = journeys::Entity::update_many()
                .col_expr(
                    journeys::Column::Status,
                    Expr::value(JourneyStatus::Completed.as_str()),
                )
                .col_expr(journeys::Column::EndTime, Expr::value(ended_at))
                .filter(journeys::Column::Id.eq(journey_id.to_string()))
                .filter(journeys::Column::Status.eq(JourneyStatus::Active.as_str()))
                .exec(&db_tx)
                .await?;
            if flipped.rows_affected != 1 {
                return Err(EngineError::InvalidState(
                    "journey is not active".to_string(),
                ));
            }

            let adjustment = match balance.deficit_minor() {
                Some(deficit) => Some(
                    self.apply_journey_deficit(&db_tx, &journey, deficit, &caller.username)
                        .await?,
                ),
                None => None,
            };

            Ok(JourneyClosing {
                journey,
                balance,
                adjustment,
            })
        })?;

        tracing::info!(
            journey_id = %journey_id,
            working_balance = closing.balance.working_balance_minor,
            final_balance = closing.balance.final_balance_minor,
            deficit = closing.balance.deficit_minor().unwrap_or(0),
            "journey completed"
        );
        Ok(closing)
    }

    /// Stores the last known position of an active journey.
    ///
    /// Only the location columns are written; the seed values are untouched.
    pub async fn record_location(
        &self,
        journey_id: Uuid,
        latitude: f64,
        longitude: f64,
        user_id: &str,
    ) -> ResultEngine<Journey> {
        let location = Location::new(latitude, longitude, Utc::now())?;
        with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, user_id).await?;
            let mut journey = self
                .require_journey_access(&db_tx, journey_id, &caller)
                .await?;
            if !journey.is_active() {
                return Err(EngineError::InvalidState(
                    "journey is not active".to_string(),
                ));
            }

            let active = journeys::ActiveModel {
                id: ActiveValue::Set(journey_id.to_string()),
                last_latitude: ActiveValue::Set(Some(location.latitude)),
                last_longitude: ActiveValue::Set(Some(location.longitude)),
                last_location_at: ActiveValue::Set(Some(location.recorded_at)),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            journey.last_location = Some(location);
            Ok(journey)
        })
    }

    /// Journey with balances recomputed from the full log.
    ///
    /// Archived journeys stay readable here.
    pub async fn journey_detail(&self, journey_id: Uuid, user_id: &str) -> ResultEngine<JourneyDetail> {
        with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, user_id).await?;
            let journey = self
                .require_journey_access(&db_tx, journey_id, &caller)
                .await?;
            let mut log = self.expenses_ascending(&db_tx, journey_id).await?;
            let balance = JourneyBalance::compute(&journey, &log)?;
            log.reverse();

            Ok(JourneyDetail {
                journey,
                balance,
                expenses: log,
            })
        })
    }

    /// Lists journeys, newest first. Drivers only see their own.
    pub async fn journeys(
        &self,
        filter: JourneyListFilter,
        user_id: &str,
    ) -> ResultEngine<Vec<Journey>> {
        with_tx!(self, |db_tx| {
            let caller = self.require_caller(&db_tx, user_id).await?;

            let mut query = journeys::Entity::find();
            if !caller.is_admin() {
                query = query.filter(journeys::Column::DriverId.eq(caller.username.clone()));
            }
            if filter.scope == JourneyScope::Active {
                query = query.filter(journeys::Column::Status.eq(JourneyStatus::Active.as_str()));
            }
            if !filter.include_archived {
                query = query.filter(journeys::Column::Archived.eq(false));
            }

            query
                .order_by_desc(journeys::Column::StartTime)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Journey::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Id of the journey currently running on a vehicle, if any.
    pub async fn vehicle_active_journey(&self, vehicle_id: Uuid) -> ResultEngine<Option<Uuid>> {
        self.active_journey_on_vehicle(&self.database, vehicle_id)
            .await?
            .map(|model| parse_uuid(&model.id, "journey"))
            .transpose()
    }
}
