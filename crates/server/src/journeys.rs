//! Journey API endpoints.

use api_types::{
    expense::{ExpenseNew, ExpenseView},
    journey::{
        JourneyDetailResponse, JourneyEndResponse, JourneyListQuery, JourneyScope, JourneyStart,
        JourneyView, LocationUpdate,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{ExpenseCmd, JourneyListFilter, StartJourneyCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    amount::{minor, optional_minor},
    server::ServerState,
    views,
};

pub async fn start(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<JourneyStart>,
) -> Result<(StatusCode, Json<JourneyView>), ServerError> {
    let driver_id = payload
        .driver_id
        .unwrap_or_else(|| user.username.clone());
    let mut cmd = StartJourneyCmd::new(
        &user.username,
        driver_id,
        payload.vehicle_id,
        minor(&payload.pouch)?,
    );
    if let Some(deposit) = optional_minor(payload.security_deposit.as_ref())? {
        cmd = cmd.security_deposit(deposit);
    }
    if let Some(destination) = payload.destination {
        cmd = cmd.destination(destination);
    }

    let journey = state.engine.start_journey(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::journey(journey))))
}

pub async fn expense_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(journey_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let mut cmd = ExpenseCmd::new(
        journey_id,
        &user.username,
        payload.kind,
        minor(&payload.amount)?,
    );
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at.with_timezone(&Utc));
    }

    let expense = state.engine.append_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::expense(expense))))
}

pub async fn expense_list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.expenses(journey_id, &user.username).await?;
    Ok(Json(expenses.into_iter().map(views::expense).collect()))
}

pub async fn location(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(journey_id): Path<Uuid>,
    Json(payload): Json<LocationUpdate>,
) -> Result<Json<JourneyView>, ServerError> {
    let journey = state
        .engine
        .record_location(journey_id, payload.latitude, payload.longitude, &user.username)
        .await?;
    Ok(Json(views::journey(journey)))
}

pub async fn end(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyEndResponse>, ServerError> {
    let closing = state.engine.end_journey(journey_id, &user.username).await?;
    Ok(Json(JourneyEndResponse {
        journey: views::journey(closing.journey),
        balance: views::balance(closing.balance),
        adjustment: closing.adjustment.map(views::salary_history),
    }))
}

pub async fn detail(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyDetailResponse>, ServerError> {
    let detail = state
        .engine
        .journey_detail(journey_id, &user.username)
        .await?;
    Ok(Json(JourneyDetailResponse {
        journey: views::journey(detail.journey),
        balance: views::balance(detail.balance),
        expenses: detail.expenses.into_iter().map(views::expense).collect(),
    }))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<JourneyListQuery>,
) -> Result<Json<Vec<JourneyView>>, ServerError> {
    let filter = JourneyListFilter {
        scope: match query.scope.unwrap_or_default() {
            JourneyScope::Active => engine::JourneyScope::Active,
            JourneyScope::All => engine::JourneyScope::All,
        },
        include_archived: query.include_archived.unwrap_or(false),
    };

    let journeys = state.engine.journeys(filter, &user.username).await?;
    Ok(Json(journeys.into_iter().map(views::journey).collect()))
}
