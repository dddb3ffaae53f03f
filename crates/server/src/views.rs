//! Mapping from engine values to API response bodies.

use api_types::{
    admin::{PeriodSummaryView, UserView, VehicleView},
    expense::ExpenseView,
    journey::{BalanceView, JourneyStatus, JourneyView, LocationView},
    salary::{SalaryHistoryKind, SalaryHistoryView, SalaryView},
};

use crate::ServerError;

fn map_status(status: engine::JourneyStatus) -> JourneyStatus {
    match status {
        engine::JourneyStatus::Active => JourneyStatus::Active,
        engine::JourneyStatus::Completed => JourneyStatus::Completed,
    }
}

fn map_history_kind(kind: engine::SalaryHistoryKind) -> SalaryHistoryKind {
    match kind {
        engine::SalaryHistoryKind::Payment => SalaryHistoryKind::Payment,
        engine::SalaryHistoryKind::Deduction => SalaryHistoryKind::Deduction,
        engine::SalaryHistoryKind::JourneyAdjustment => SalaryHistoryKind::JourneyAdjustment,
        engine::SalaryHistoryKind::Payout => SalaryHistoryKind::Payout,
    }
}

pub(crate) fn journey(journey: engine::Journey) -> JourneyView {
    JourneyView {
        id: journey.id,
        driver_id: journey.driver_id,
        vehicle_id: journey.vehicle_id,
        destination: journey.destination,
        pouch_minor: journey.pouch_minor,
        security_deposit_minor: journey.security_deposit_minor,
        status: map_status(journey.status),
        archived: journey.archived,
        start_time: journey.start_time,
        end_time: journey.end_time,
        last_location: journey.last_location.map(|location| LocationView {
            latitude: location.latitude,
            longitude: location.longitude,
            recorded_at: location.recorded_at,
        }),
    }
}

pub(crate) fn balance(balance: engine::JourneyBalance) -> BalanceView {
    BalanceView {
        total_regular_minor: balance.total_regular_minor,
        total_top_up_minor: balance.total_top_up_minor,
        total_hyd_inward_minor: balance.total_hyd_inward_minor,
        working_balance_minor: balance.working_balance_minor,
        final_balance_minor: balance.final_balance_minor,
    }
}

pub(crate) fn expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        journey_id: expense.journey_id,
        kind: expense.kind.as_tag().to_string(),
        amount_minor: expense.amount_minor,
        note: expense.note,
        created_by: expense.created_by,
        occurred_at: expense.occurred_at,
    }
}

pub(crate) fn salary(salary: engine::Salary) -> Result<SalaryView, ServerError> {
    Ok(SalaryView {
        balance_minor: salary.balance_minor()?,
        user_id: salary.user_id,
        salary_minor: salary.salary_minor,
        paid_minor: salary.paid_minor,
        last_updated: salary.last_updated,
    })
}

pub(crate) fn salary_history(entry: engine::SalaryHistoryEntry) -> SalaryHistoryView {
    SalaryHistoryView {
        id: entry.id,
        user_id: entry.user_id,
        kind: map_history_kind(entry.kind),
        amount_minor: entry.amount_minor,
        paid_before_minor: entry.paid_before_minor,
        paid_after_minor: entry.paid_after_minor,
        journey_id: entry.journey_id,
        note: entry.note,
        created_by: entry.created_by,
        created_at: entry.created_at,
    }
}

pub(crate) fn vehicle(vehicle: engine::Vehicle) -> VehicleView {
    VehicleView {
        id: vehicle.id,
        registration: vehicle.registration,
        label: vehicle.label,
        created_at: vehicle.created_at,
    }
}

pub(crate) fn user(user: engine::User) -> UserView {
    UserView {
        role: user.role.as_str().to_string(),
        status: user.status.as_str().to_string(),
        username: user.username,
        display_name: user.display_name,
    }
}

pub(crate) fn summary(summary: engine::PeriodSummary) -> PeriodSummaryView {
    PeriodSummaryView {
        active_journeys: summary.active_journeys,
        completed_journeys: summary.completed_journeys,
        total_pouch_minor: summary.total_pouch_minor,
        total_top_up_minor: summary.total_top_up_minor,
        total_regular_minor: summary.total_regular_minor,
        total_hyd_inward_minor: summary.total_hyd_inward_minor,
        total_deficit_minor: summary.total_deficit_minor,
        salary_payouts_minor: summary.salary_payouts_minor,
        salary_refunds_minor: summary.salary_refunds_minor,
        profit_minor: summary.profit_minor,
    }
}
