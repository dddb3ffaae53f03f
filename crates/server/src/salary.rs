//! Payroll API endpoints.

use api_types::salary::{SalaryResponse, SalaryUpdate, SalaryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{SalaryEntry, SalaryUpdateCmd, User};

use crate::{
    ServerError,
    amount::{minor, optional_minor},
    server::ServerState,
    views,
};

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<SalaryResponse>, ServerError> {
    let salary = state.engine.salary(&user_id, &user.username).await?;
    let history = state
        .engine
        .salary_history(&user_id, &user.username)
        .await?;

    Ok(Json(SalaryResponse {
        salary: views::salary(salary)?,
        history: history.into_iter().map(views::salary_history).collect(),
    }))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<SalaryUpdate>,
) -> Result<Json<SalaryView>, ServerError> {
    let mut cmd = SalaryUpdateCmd::new(&user.username, user_id);
    if let Some(salary) = optional_minor(payload.salary_amount.as_ref())? {
        cmd = cmd.salary(salary);
    }
    if let Some(paid) = optional_minor(payload.paid_amount.as_ref())? {
        cmd = cmd.paid(paid);
    }
    for entry in payload.entries {
        let mut parsed = SalaryEntry::new(minor(&entry.amount)?);
        if let Some(note) = entry.note {
            parsed = parsed.note(note);
        }
        cmd = cmd.entry(parsed);
    }

    let salary = state.engine.update_salary(cmd).await?;
    Ok(Json(views::salary(salary)?))
}

pub async fn payout(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<SalaryView>, ServerError> {
    let salary = state
        .engine
        .payout_salary(&user_id, &user.username)
        .await?;
    Ok(Json(views::salary(salary)?))
}
