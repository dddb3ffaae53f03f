//! Administrative endpoints: archival, reporting, user and fleet upkeep.

use api_types::admin::{PeriodSummaryView, ResetResponse, UserView, VehicleNew, VehicleView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;

use crate::{ServerError, server::ServerState, views};

pub async fn reset(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ResetResponse>, ServerError> {
    let outcome = state
        .engine
        .archive_completed_journeys(&user.username)
        .await?;
    Ok(Json(ResetResponse {
        archived_count: outcome.archived_count,
    }))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<PeriodSummaryView>, ServerError> {
    let summary = state.engine.period_summary(&user.username).await?;
    Ok(Json(views::summary(summary)))
}

pub async fn deactivate_user(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let deactivated = state
        .engine
        .deactivate_user(&username, &user.username)
        .await?;
    Ok(Json(views::user(deactivated)))
}

pub async fn vehicle_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<VehicleNew>,
) -> Result<(StatusCode, Json<VehicleView>), ServerError> {
    let vehicle = state
        .engine
        .register_vehicle(
            &payload.registration,
            payload.label.as_deref(),
            &user.username,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::vehicle(vehicle))))
}

pub async fn vehicles(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<VehicleView>>, ServerError> {
    let vehicles = state.engine.vehicles(&user.username).await?;
    Ok(Json(vehicles.into_iter().map(views::vehicle).collect()))
}
