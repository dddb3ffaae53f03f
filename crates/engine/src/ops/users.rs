use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};

use crate::{
    EngineError, Expense, ExpenseKind, Journey, JourneyStatus, ResultEngine, Role, User,
    UserStatus, Vehicle, expenses, journeys, users, vehicles,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a user. Used to bootstrap accounts from the admin CLI.
    pub async fn new_user(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
        role: Role,
    ) -> ResultEngine<User> {
        let username = normalize_required(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let display_name =
            normalize_optional_text(display_name).unwrap_or_else(|| username.clone());

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.clone()));
            }

            let model = users::ActiveModel::new_user(
                username.clone(),
                password.to_string(),
                display_name.clone(),
                role,
                Utc::now(),
            )
            .insert(&db_tx)
            .await?;
            User::try_from(model)
        })
    }

    /// Resolves HTTP credentials. Unknown users, wrong passwords and
    /// deactivated accounts all yield `None`.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let Some(model) = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        if model.password != password {
            return Ok(None);
        }
        let user = User::try_from(model)?;
        Ok(user.is_active().then_some(user))
    }

    /// Deactivates a driver. The row stays so historical journeys keep their
    /// driver; each of their active journeys gets a `system` annotation.
    pub async fn deactivate_user(&self, target_user_id: &str, user_id: &str) -> ResultEngine<User> {
        let user = with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, user_id).await?;
            let mut target = self.require_user(&db_tx, target_user_id).await?;
            if target.username == admin.username {
                return Err(EngineError::InvalidInput(
                    "admins cannot deactivate themselves".to_string(),
                ));
            }
            if !target.is_active() {
                return Ok(target);
            }

            users::ActiveModel {
                username: ActiveValue::Set(target.username.clone()),
                status: ActiveValue::Set(UserStatus::Deactivated.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            target.status = UserStatus::Deactivated;

            let active = journeys::Entity::find()
                .filter(journeys::Column::DriverId.eq(target.username.clone()))
                .filter(journeys::Column::Status.eq(JourneyStatus::Active.as_str()))
                .all(&db_tx)
                .await?;
            for model in active {
                let journey = Journey::try_from(model)?;
                let note = Expense::new(
                    journey.id,
                    ExpenseKind::System,
                    0,
                    Some("driver record deactivated".to_string()),
                    admin.username.clone(),
                    Utc::now(),
                )?;
                expenses::ActiveModel::from(&note).insert(&db_tx).await?;
            }

            Ok(target)
        })?;

        tracing::info!(user = %user.username, "user deactivated");
        Ok(user)
    }

    /// Registers a vehicle. Registrations are unique.
    pub async fn register_vehicle(
        &self,
        registration: &str,
        label: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Vehicle> {
        let registration = normalize_required(registration, "registration")?.to_uppercase();
        let vehicle = Vehicle::new(registration, normalize_optional_text(label));

        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, user_id).await?;

            if let Err(err) = vehicles::ActiveModel::from(&vehicle).insert(&db_tx).await {
                if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                    return Err(EngineError::ExistingKey(vehicle.registration.clone()));
                }
                return Err(err.into());
            }
            Ok(())
        })?;

        tracing::info!(vehicle_id = %vehicle.id, registration = %vehicle.registration, "vehicle registered");
        Ok(vehicle)
    }

    /// All registered vehicles.
    pub async fn vehicles(&self, user_id: &str) -> ResultEngine<Vec<Vehicle>> {
        self.require_caller(&self.database, user_id).await?;
        vehicles::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }
}
