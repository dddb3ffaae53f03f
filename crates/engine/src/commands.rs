//! Command structs for engine operations.
//!
//! These types group parameters for write operations (journey start,
//! expense append, salary edits), keeping call sites readable and avoiding
//! long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Start a journey for `driver_id` on `vehicle_id`.
#[derive(Clone, Debug)]
pub struct StartJourneyCmd {
    pub driver_id: String,
    pub vehicle_id: Uuid,
    pub pouch_minor: i64,
    pub security_deposit_minor: i64,
    pub destination: Option<String>,
    pub started_at: DateTime<Utc>,
    /// Caller; must be the driver or an admin.
    pub user_id: String,
}

impl StartJourneyCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        driver_id: impl Into<String>,
        vehicle_id: Uuid,
        pouch_minor: i64,
    ) -> Self {
        Self {
            driver_id: driver_id.into(),
            vehicle_id,
            pouch_minor,
            security_deposit_minor: 0,
            destination: None,
            started_at: Utc::now(),
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn security_deposit(mut self, security_deposit_minor: i64) -> Self {
        self.security_deposit_minor = security_deposit_minor;
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }
}

/// Append a cash event to a journey's expense log.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub journey_id: Uuid,
    /// Raw category tag, parsed into an `ExpenseKind`.
    pub kind: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub user_id: String,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        journey_id: Uuid,
        user_id: impl Into<String>,
        kind: impl Into<String>,
        amount_minor: i64,
    ) -> Self {
        Self {
            journey_id,
            kind: kind.into(),
            amount_minor,
            note: None,
            occurred_at: Utc::now(),
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}

/// One signed admin payroll entry: `>= 0` is a payment, `< 0` a deduction.
#[derive(Clone, Debug)]
pub struct SalaryEntry {
    pub amount_minor: i64,
    pub note: Option<String>,
}

impl SalaryEntry {
    #[must_use]
    pub fn new(amount_minor: i64) -> Self {
        Self {
            amount_minor,
            note: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Administrative salary edit for `target_user_id`.
///
/// Applied in order: entitlement, absolute paid correction, entries.
#[derive(Clone, Debug)]
pub struct SalaryUpdateCmd {
    pub target_user_id: String,
    pub salary_minor: Option<i64>,
    pub paid_minor: Option<i64>,
    pub entries: Vec<SalaryEntry>,
    pub user_id: String,
}

impl SalaryUpdateCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, target_user_id: impl Into<String>) -> Self {
        Self {
            target_user_id: target_user_id.into(),
            salary_minor: None,
            paid_minor: None,
            entries: Vec::new(),
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn salary(mut self, salary_minor: i64) -> Self {
        self.salary_minor = Some(salary_minor);
        self
    }

    #[must_use]
    pub fn paid(mut self, paid_minor: i64) -> Self {
        self.paid_minor = Some(paid_minor);
        self
    }

    #[must_use]
    pub fn entry(mut self, entry: SalaryEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// Which journeys a listing returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JourneyScope {
    #[default]
    Active,
    All,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JourneyListFilter {
    pub scope: JourneyScope,
    /// Archived journeys are excluded unless asked for.
    pub include_archived: bool,
}
