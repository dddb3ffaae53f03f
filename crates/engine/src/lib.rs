//! Journey ledger engine.
//!
//! Drivers run journeys funded by a cash advance (the pouch) and log typed
//! cash events against them. The engine derives balances from that
//! append-only log, drives journeys through `active -> completed ->
//! archived`, and carries unresolved deficits into the driver's payroll.

pub use balance::JourneyBalance;
pub use commands::{
    ExpenseCmd, JourneyListFilter, JourneyScope, SalaryEntry, SalaryUpdateCmd, StartJourneyCmd,
};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseKind, SalaryAdjustmentKind};
pub use financial_resets::FinancialReset;
pub use journeys::{Journey, JourneyStatus, Location};
pub use money::Money;
pub use ops::{ArchiveOutcome, Engine, EngineBuilder, JourneyClosing, JourneyDetail, PeriodSummary};
pub use payroll_postings::PayrollPosting;
pub use salaries::Salary;
pub use salary_history::{SalaryHistoryEntry, SalaryHistoryKind};
pub use users::{Role, User, UserStatus};
pub use vehicles::Vehicle;

mod balance;
mod commands;
mod error;
mod expenses;
mod financial_resets;
mod journeys;
mod money;
mod ops;
mod payroll_postings;
mod salaries;
mod salary_history;
mod users;
mod util;
mod vehicles;

type ResultEngine<T> = Result<T, EngineError>;
