//! Minimal vehicle registry: journeys reference a vehicle by id.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub registration: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(registration: String, label: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            registration,
            label,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub registration: String,
    pub label: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journeys::Entity")]
    Journeys,
}

impl Related<super::journeys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journeys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Vehicle> for ActiveModel {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: ActiveValue::Set(vehicle.id.to_string()),
            registration: ActiveValue::Set(vehicle.registration.clone()),
            label: ActiveValue::Set(vehicle.label.clone()),
            created_at: ActiveValue::Set(vehicle.created_at),
        }
    }
}

impl TryFrom<Model> for Vehicle {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "vehicle")?,
            registration: model.registration,
            label: model.label,
            created_at: model.created_at,
        })
    }
}
