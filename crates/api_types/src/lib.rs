use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money field of a request, in minor units.
///
/// Clients send either a JSON integer or a numeric string. Fractional
/// numbers are kept so the server can reject them with 422.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Minor(i64),
    Fractional(f64),
    Text(String),
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self::Minor(value)
    }
}

pub mod journey {
    use super::*;
    use crate::expense::ExpenseView;
    use crate::salary::SalaryHistoryView;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum JourneyStatus {
        Active,
        Completed,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum JourneyScope {
        #[default]
        Active,
        All,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct JourneyStart {
        /// Defaults to the caller. Only admins may start for someone else.
        pub driver_id: Option<String>,
        pub vehicle_id: Uuid,
        pub pouch: Amount,
        pub security_deposit: Option<Amount>,
        pub destination: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LocationUpdate {
        pub latitude: f64,
        pub longitude: f64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct JourneyListQuery {
        pub scope: Option<JourneyScope>,
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LocationView {
        pub latitude: f64,
        pub longitude: f64,
        pub recorded_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct JourneyView {
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
        pub last_location: Option<LocationView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BalanceView {
        pub total_regular_minor: i64,
        pub total_top_up_minor: i64,
        pub total_hyd_inward_minor: i64,
        pub working_balance_minor: i64,
        /// Includes the security deposit and HYD inward once completed.
        pub final_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JourneyDetailResponse {
        pub journey: JourneyView,
        pub balance: BalanceView,
        /// Newest first.
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JourneyEndResponse {
        pub journey: JourneyView,
        pub balance: BalanceView,
        /// Present when the journey closed with a deficit.
        pub adjustment: Option<SalaryHistoryView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        /// Category tag: `topUp`, `hydInward`, `system` or any regular
        /// category such as `fuel`.
        #[serde(rename = "type")]
        pub kind: String,
        pub amount: Amount,
        pub note: Option<String>,
        /// RFC3339 timestamp; the server uses now() when absent.
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: Uuid,
        pub journey_id: Uuid,
        #[serde(rename = "type")]
        pub kind: String,
        pub amount_minor: i64,
        pub note: Option<String>,
        pub created_by: String,
        pub occurred_at: DateTime<Utc>,
    }
}

pub mod salary {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SalaryHistoryKind {
        Payment,
        Deduction,
        JourneyAdjustment,
        Payout,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SalaryEntryNew {
        /// `>= 0` is a payment, `< 0` a deduction.
        pub amount: Amount,
        pub note: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SalaryUpdate {
        pub salary_amount: Option<Amount>,
        /// Absolute correction of the paid amount.
        pub paid_amount: Option<Amount>,
        #[serde(default)]
        pub entries: Vec<SalaryEntryNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SalaryView {
        pub user_id: String,
        pub salary_minor: i64,
        pub paid_minor: i64,
        /// `salary - paid`, negative when the driver owes the company.
        pub balance_minor: i64,
        pub last_updated: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SalaryHistoryView {
        pub id: Uuid,
        pub user_id: String,
        pub kind: SalaryHistoryKind,
        pub amount_minor: i64,
        pub paid_before_minor: i64,
        pub paid_after_minor: i64,
        pub journey_id: Option<Uuid>,
        pub note: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SalaryResponse {
        pub salary: SalaryView,
        /// Newest first.
        pub history: Vec<SalaryHistoryView>,
    }
}

pub mod admin {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResetResponse {
        pub archived_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PeriodSummaryView {
        pub active_journeys: u64,
        pub completed_journeys: u64,
        pub total_pouch_minor: i64,
        pub total_top_up_minor: i64,
        pub total_regular_minor: i64,
        pub total_hyd_inward_minor: i64,
        pub total_deficit_minor: i64,
        pub salary_payouts_minor: i64,
        pub salary_refunds_minor: i64,
        pub profit_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleNew {
        pub registration: String,
        pub label: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VehicleView {
        pub id: Uuid,
        pub registration: String,
        pub label: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub username: String,
        pub display_name: String,
        pub role: String,
        pub status: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_numbers_and_strings() {
        let number: Amount = serde_json::from_str("1500").unwrap();
        assert_eq!(number, Amount::Minor(1500));

        let text: Amount = serde_json::from_str("\"-750\"").unwrap();
        assert_eq!(text, Amount::Text("-750".to_string()));

        let fractional: Amount = serde_json::from_str("15.5").unwrap();
        assert_eq!(fractional, Amount::Fractional(15.5));
    }

    #[test]
    fn expense_type_field_is_renamed() {
        let payload: expense::ExpenseNew =
            serde_json::from_str(r#"{"type":"fuel","amount":"1500","note":null}"#).unwrap();
        assert_eq!(payload.kind, "fuel");
        assert_eq!(payload.amount, Amount::Text("1500".to_string()));
        assert!(payload.occurred_at.is_none());
    }

    #[test]
    fn list_query_uses_camel_case() {
        let query: journey::JourneyListQuery =
            serde_json::from_str(r#"{"scope":"all","includeArchived":true}"#).unwrap();
        assert_eq!(query.scope, Some(journey::JourneyScope::All));
        assert_eq!(query.include_archived, Some(true));
    }
}
