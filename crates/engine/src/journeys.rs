//! Journey primitives.
//!
//! A `Journey` is one funded trip: a driver takes a vehicle and a cash
//! advance (the pouch). `pouch_minor` and `security_deposit_minor` are set at
//! creation and never written again; only the lifecycle columns and the last
//! known location change afterwards.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Active,
    Completed,
}

impl JourneyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for JourneyStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid journey status: {other}"
            ))),
        }
    }
}

/// Last reported position of the vehicle on an active journey.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, recorded_at: DateTime<Utc>) -> ResultEngine<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(EngineError::InvalidInput(
                "latitude must be within [-90, 90]".to_string(),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(EngineError::InvalidInput(
                "longitude must be within [-180, 180]".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            recorded_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub driver_id: String,
    pub vehicle_id: Uuid,
    pub destination: Option<String>,
    pub pouch_minor: i64,
    pub security_deposit_minor: i64,
    pub status: JourneyStatus,
    pub archived: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_location: Option<Location>,
}

impl Journey {
    pub fn new(
        driver_id: String,
        vehicle_id: Uuid,
        destination: Option<String>,
        pouch_minor: i64,
        security_deposit_minor: i64,
        start_time: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if pouch_minor < 0 {
            return Err(EngineError::InvalidInput(
                "pouch must be >= 0".to_string(),
            ));
        }
        if security_deposit_minor < 0 {
            return Err(EngineError::InvalidInput(
                "security deposit must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            vehicle_id,
            destination,
            pouch_minor,
            security_deposit_minor,
            status: JourneyStatus::Active,
            archived: false,
            start_time,
            end_time: None,
            last_location: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == JourneyStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == JourneyStatus::Completed
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "journeys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub destination: Option<String>,
    pub pouch_minor: i64,
    pub security_deposit_minor: i64,
    pub status: String,
    pub archived: bool,
    pub start_time: DateTimeUtc,
    pub end_time: Option<DateTimeUtc>,
    pub last_latitude: Option<f64>,
    pub last_longitude: Option<f64>,
    pub last_location_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vehicles,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Journey> for ActiveModel {
    fn from(journey: &Journey) -> Self {
        Self {
            id: ActiveValue::Set(journey.id.to_string()),
            driver_id: ActiveValue::Set(journey.driver_id.clone()),
            vehicle_id: ActiveValue::Set(journey.vehicle_id.to_string()),
            destination: ActiveValue::Set(journey.destination.clone()),
            pouch_minor: ActiveValue::Set(journey.pouch_minor),
            security_deposit_minor: ActiveValue::Set(journey.security_deposit_minor),
            status: ActiveValue::Set(journey.status.as_str().to_string()),
            archived: ActiveValue::Set(journey.archived),
            start_time: ActiveValue::Set(journey.start_time),
            end_time: ActiveValue::Set(journey.end_time),
            last_latitude: ActiveValue::Set(journey.last_location.map(|l| l.latitude)),
            last_longitude: ActiveValue::Set(journey.last_location.map(|l| l.longitude)),
            last_location_at: ActiveValue::Set(journey.last_location.map(|l| l.recorded_at)),
        }
    }
}

impl TryFrom<Model> for Journey {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let last_location = match (
            model.last_latitude,
            model.last_longitude,
            model.last_location_at,
        ) {
            (Some(latitude), Some(longitude), Some(recorded_at)) => Some(Location {
                latitude,
                longitude,
                recorded_at,
            }),
            _ => None,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "journey")?,
            vehicle_id: parse_uuid(&model.vehicle_id, "vehicle")?,
            status: JourneyStatus::try_from(model.status.as_str())?,
            driver_id: model.driver_id,
            destination: model.destination,
            pouch_minor: model.pouch_minor,
            security_deposit_minor: model.security_deposit_minor,
            archived: model.archived,
            start_time: model.start_time,
            end_time: model.end_time,
            last_location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_journey_starts_active_and_unarchived() {
        let journey = Journey::new(
            "ravi".to_string(),
            Uuid::new_v4(),
            Some("Hyderabad".to_string()),
            10_000,
            1_000,
            Utc::now(),
        )
        .unwrap();

        assert!(journey.is_active());
        assert!(!journey.archived);
        assert!(journey.end_time.is_none());
    }

    #[test]
    fn negative_seed_values_are_rejected() {
        let err = Journey::new("ravi".into(), Uuid::new_v4(), None, -1, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        let err = Journey::new("ravi".into(), Uuid::new_v4(), None, 0, -1, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn location_bounds_are_validated() {
        assert!(Location::new(17.38, 78.48, Utc::now()).is_ok());
        assert!(Location::new(91.0, 0.0, Utc::now()).is_err());
        assert!(Location::new(0.0, -181.0, Utc::now()).is_err());
        assert!(Location::new(f64::NAN, 0.0, Utc::now()).is_err());
    }
}
