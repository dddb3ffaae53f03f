use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Journey, ResultEngine, Role, User, journeys, users, vehicles,
};

use super::Engine;

/// Generates a `require_*` lookup for an entity keyed by a string id.
macro_rules! impl_require_by_id {
    ($require_fn:ident, $entity:path, $model:ty, $err_msg:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: &str,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_by_id!(require_user_model, users::Entity, users::Model, "user not exists");
    impl_require_by_id!(
        require_vehicle_model,
        vehicles::Entity,
        vehicles::Model,
        "vehicle not exists"
    );
    impl_require_by_id!(
        require_journey_model,
        journeys::Entity,
        journeys::Model,
        "journey not exists"
    );

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<User> {
        User::try_from(self.require_user_model(db, username).await?)
    }

    /// Resolves the calling user. Deactivated accounts may not act.
    pub(super) async fn require_caller<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<User> {
        let user = self.require_user(db, user_id).await?;
        if !user.is_active() {
            return Err(EngineError::Forbidden("user is deactivated".to_string()));
        }
        Ok(user)
    }

    pub(super) async fn require_admin<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<User> {
        let user = self.require_caller(db, user_id).await?;
        if user.role != Role::Admin {
            return Err(EngineError::Forbidden("admin role required".to_string()));
        }
        Ok(user)
    }

    /// Loads a journey the caller may act on: its own driver or any admin.
    ///
    /// A missing journey is `KeyNotFound`, a foreign one is `Forbidden`.
    pub(super) async fn require_journey_access<C: ConnectionTrait>(
        &self,
        db: &C,
        journey_id: Uuid,
        caller: &User,
    ) -> ResultEngine<Journey> {
        let model = self
            .require_journey_model(db, &journey_id.to_string())
            .await?;
        if !caller.is_admin() && model.driver_id != caller.username {
            return Err(EngineError::Forbidden(
                "journey belongs to another driver".to_string(),
            ));
        }
        Journey::try_from(model)
    }

    /// Caller may read `target` data: themselves or an admin.
    pub(super) fn require_self_or_admin(&self, caller: &User, target: &str) -> ResultEngine<()> {
        if caller.is_admin() || caller.username == target {
            return Ok(());
        }
        Err(EngineError::Forbidden(
            "admin role required".to_string(),
        ))
    }

    pub(super) async fn active_journey_on_vehicle<C: ConnectionTrait>(
        &self,
        db: &C,
        vehicle_id: Uuid,
    ) -> ResultEngine<Option<journeys::Model>> {
        journeys::Entity::find()
            .filter(journeys::Column::VehicleId.eq(vehicle_id.to_string()))
            .filter(journeys::Column::Status.eq(crate::JourneyStatus::Active.as_str()))
            .filter(journeys::Column::Archived.eq(false))
            .one(db)
            .await
            .map_err(Into::into)
    }
}
