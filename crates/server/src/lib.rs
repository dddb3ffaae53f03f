use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener};

mod admin;
mod amount;
mod journeys;
mod salary;
mod server;
mod views;

pub mod types {
    pub use api_types::Amount;

    pub mod journey {
        pub use api_types::journey::{
            BalanceView, JourneyDetailResponse, JourneyEndResponse, JourneyListQuery,
            JourneyScope, JourneyStart, JourneyStatus, JourneyView, LocationUpdate, LocationView,
        };
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseView};
    }

    pub mod salary {
        pub use api_types::salary::{
            SalaryEntryNew, SalaryHistoryKind, SalaryHistoryView, SalaryResponse, SalaryUpdate,
            SalaryView,
        };
    }

    pub mod admin {
        pub use api_types::admin::{
            PeriodSummaryView, ResetResponse, UserView, VehicleNew, VehicleView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::VehicleBusy(_)
        | EngineError::InvalidState(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidInput(_) | EngineError::InvalidId(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError::Engine(err) = self;
        let (status, error) = (status_for_engine_error(&err), message_for_engine_error(err));

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn vehicle_busy_and_bad_state_map_to_409() {
        let busy = ServerError::from(EngineError::VehicleBusy("x".to_string())).into_response();
        assert_eq!(busy.status(), StatusCode::CONFLICT);

        let state = ServerError::from(EngineError::InvalidState("x".to_string())).into_response();
        assert_eq!(state.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_errors_map_to_500() {
        let res = ServerError::from(EngineError::Database(DbErr::Custom("boom".to_string())))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
