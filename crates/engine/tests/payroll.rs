mod common;

use engine::{
    EngineError, ExpenseCmd, SalaryEntry, SalaryHistoryKind, SalaryUpdateCmd, StartJourneyCmd,
};

use sea_orm::ConnectionTrait;

use common::{ADMIN, MEENA, RAVI, fleet};

#[tokio::test]
async fn deficit_moves_into_paid_amount() {
    let fleet = fleet().await;
    let engine = &fleet.engine;
    let journey = engine
        .start_journey(StartJourneyCmd::new(RAVI, RAVI, fleet.truck, 1_000))
        .await
        .unwrap();
    engine
        .append_expense(ExpenseCmd::new(journey.id, RAVI, "fuel", 1_750))
        .await
        .unwrap();

    let closing = engine.end_journey(journey.id, RAVI).await.unwrap();
    assert_eq!(closing.balance.working_balance_minor, -750);
    let adjustment = closing.adjustment.unwrap();
    assert_eq!(adjustment.kind, SalaryHistoryKind::JourneyAdjustment);
    assert_eq!(adjustment.amount_minor, 750);
    assert_eq!(adjustment.paid_before_minor, 0);
    assert_eq!(adjustment.paid_after_minor, 750);
    assert_eq!(adjustment.journey_id, Some(journey.id));

    let salary = engine.salary(RAVI, RAVI).await.unwrap();
    assert_eq!(salary.paid_minor, 750);
    assert_eq!(salary.balance_minor().unwrap(), -750);

    let history = engine.salary_history(RAVI, ADMIN).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, adjustment.id);
}

#[tokio::test]
async fn failed_payroll_write_rolls_back_the_end() {
    let fleet = fleet().await;
    let engine = &fleet.engine;
    let journey = engine
        .start_journey(StartJourneyCmd::new(RAVI, RAVI, fleet.truck, 1_000))
        .await
        .unwrap();
    engine
        .append_expense(ExpenseCmd::new(journey.id, RAVI, "fuel", 1_750))
        .await
        .unwrap();
    fleet
        .db
        .execute_unprepared(
            "CREATE TRIGGER reject_salary_history BEFORE INSERT ON salary_history \
             BEGIN SELECT RAISE(ABORT, 'salary history unavailable'); END",
        )
        .await
        .unwrap();

    let ended = engine.end_journey(journey.id, RAVI).await;
    assert!(matches!(ended, Err(EngineError::Database(_))));

    let detail = engine.journey_detail(journey.id, RAVI).await.unwrap();
    assert!(detail.journey.is_active());
    assert!(detail.journey.end_time.is_none());
    assert_eq!(engine.salary(RAVI, ADMIN).await.unwrap().paid_minor, 0);
    assert!(engine.salary_history(RAVI, ADMIN).await.unwrap().is_empty());
    assert_eq!(
        engine.vehicle_active_journey(fleet.truck).await.unwrap(),
        Some(journey.id)
    );
}

#[tokio::test]
async fn balanced_journey_leaves_payroll_untouched() {
    let fleet = fleet().await;
    let engine = &fleet.engine;
    let journey = engine
        .start_journey(StartJourneyCmd::new(RAVI, RAVI, fleet.truck, 1_000))
        .await
        .unwrap();
    engine
        .append_expense(ExpenseCmd::new(journey.id, RAVI, "fuel", 1_000))
        .await
        .unwrap();

    let closing = engine.end_journey(journey.id, RAVI).await.unwrap();
    assert_eq!(closing.balance.working_balance_minor, 0);
    assert!(closing.adjustment.is_none());

    let salary = engine.salary(RAVI, ADMIN).await.unwrap();
    assert_eq!(salary.paid_minor, 0);
    assert!(engine.salary_history(RAVI, ADMIN).await.unwrap().is_empty());
}

#[tokio::test]
async fn deficits_accumulate_across_journeys() {
    let fleet = fleet().await;
    let engine = &fleet.engine;

    for (vehicle, overspend) in [(fleet.truck, 300), (fleet.van, 200)] {
        let journey = engine
            .start_journey(StartJourneyCmd::new(RAVI, RAVI, vehicle, 1_000))
            .await
            .unwrap();
        engine
            .append_expense(ExpenseCmd::new(journey.id, RAVI, "loading", 1_000 + overspend))
            .await
            .unwrap();
        engine.end_journey(journey.id, RAVI).await.unwrap();
    }

    let salary = engine.salary(RAVI, RAVI).await.unwrap();
    assert_eq!(salary.paid_minor, 500);
    let history = engine.salary_history(RAVI, RAVI).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].paid_after_minor, 500);
}

#[tokio::test]
async fn admin_updates_write_history_rows() {
    let fleet = fleet().await;
    let engine = &fleet.engine;

    let salary = engine
        .update_salary(
            SalaryUpdateCmd::new(ADMIN, MEENA)
                .salary(30_000)
                .paid(1_000)
                .entry(SalaryEntry::new(5_000).note("advance"))
                .entry(SalaryEntry::new(-400).note("damaged crate")),
        )
        .await
        .unwrap();
    assert_eq!(salary.salary_minor, 30_000);
    assert_eq!(salary.paid_minor, 5_600);

    let history = engine.salary_history(MEENA, ADMIN).await.unwrap();
    let kinds: Vec<_> = history.iter().rev().map(|entry| entry.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SalaryHistoryKind::Payment,
            SalaryHistoryKind::Payment,
            SalaryHistoryKind::Deduction
        ]
    );
    assert_eq!(history[0].amount_minor, -400);
    assert_eq!(history[0].paid_before_minor, 6_000);
    assert_eq!(history[0].paid_after_minor, 5_600);

    let unchanged = engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, MEENA).paid(5_600))
        .await
        .unwrap();
    assert_eq!(unchanged.paid_minor, 5_600);
    assert_eq!(engine.salary_history(MEENA, ADMIN).await.unwrap().len(), 3);
}

#[tokio::test]
async fn salary_updates_are_validated() {
    let fleet = fleet().await;
    let engine = &fleet.engine;

    let by_driver = engine
        .update_salary(SalaryUpdateCmd::new(RAVI, RAVI).salary(99_999))
        .await;
    assert!(matches!(by_driver, Err(EngineError::Forbidden(_))));

    let negative = engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, RAVI).salary(-1))
        .await;
    assert!(matches!(negative, Err(EngineError::InvalidInput(_))));

    let zero_entry = engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, RAVI).entry(SalaryEntry::new(0)))
        .await
        .unwrap();
    assert_eq!(zero_entry.paid_minor, 0);
    assert!(engine.salary_history(RAVI, ADMIN).await.unwrap().is_empty());

    let unknown = engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, "nobody").salary(1))
        .await;
    assert!(matches!(unknown, Err(EngineError::KeyNotFound(_))));

    let peek = engine.salary(MEENA, RAVI).await;
    assert!(matches!(peek, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn deductions_replace_the_period_refund() {
    let fleet = fleet().await;
    let engine = &fleet.engine;

    engine
        .update_salary(
            SalaryUpdateCmd::new(ADMIN, RAVI)
                .entry(SalaryEntry::new(-300))
                .entry(SalaryEntry::new(-200)),
        )
        .await
        .unwrap();
    let summary = engine.period_summary(ADMIN).await.unwrap();
    assert_eq!(summary.salary_refunds_minor, 200);

    engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, RAVI).entry(SalaryEntry::new(-100)))
        .await
        .unwrap();
    let summary = engine.period_summary(ADMIN).await.unwrap();
    assert_eq!(summary.salary_refunds_minor, 100);
    assert_eq!(summary.profit_minor, 100);

    engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, MEENA).entry(SalaryEntry::new(-50)))
        .await
        .unwrap();
    let summary = engine.period_summary(ADMIN).await.unwrap();
    assert_eq!(summary.salary_refunds_minor, 150);
}

#[tokio::test]
async fn payout_books_balance_and_resets_paid() {
    let fleet = fleet().await;
    let engine = &fleet.engine;
    engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, RAVI).salary(20_000).paid(500))
        .await
        .unwrap();

    let salary = engine.payout_salary(RAVI, ADMIN).await.unwrap();
    assert_eq!(salary.paid_minor, 0);
    assert_eq!(salary.salary_minor, 20_000);

    let history = engine.salary_history(RAVI, RAVI).await.unwrap();
    assert_eq!(history[0].kind, SalaryHistoryKind::Payout);
    assert_eq!(history[0].amount_minor, -500);
    assert_eq!(history[0].paid_after_minor, 0);

    let summary = engine.period_summary(ADMIN).await.unwrap();
    assert_eq!(summary.salary_payouts_minor, 19_500);
    assert_eq!(summary.profit_minor, -19_500);

    let denied = engine.payout_salary(RAVI, MEENA).await;
    assert!(matches!(denied, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn payroll_overflow_is_rejected() {
    let fleet = fleet().await;
    let engine = &fleet.engine;
    engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, RAVI).salary(i64::MAX).paid(-1))
        .await
        .unwrap();

    let payout = engine.payout_salary(RAVI, ADMIN).await;
    assert!(matches!(payout, Err(EngineError::InvalidInput(_))));
    assert_eq!(engine.salary(RAVI, ADMIN).await.unwrap().paid_minor, -1);

    engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, MEENA).paid(i64::MAX))
        .await
        .unwrap();
    let entry = engine
        .update_salary(SalaryUpdateCmd::new(ADMIN, MEENA).entry(SalaryEntry::new(1)))
        .await;
    assert!(matches!(entry, Err(EngineError::InvalidInput(_))));

    let salary = engine.salary(MEENA, ADMIN).await.unwrap();
    assert_eq!(salary.paid_minor, i64::MAX);
    assert_eq!(engine.salary_history(MEENA, ADMIN).await.unwrap().len(), 1);
}

#[tokio::test]
async fn period_summary_covers_the_current_period() {
    let fleet = fleet().await;
    let engine = &fleet.engine;
    let journey = engine
        .start_journey(StartJourneyCmd::new(RAVI, RAVI, fleet.truck, 10_000))
        .await
        .unwrap();
    for (kind, amount) in [("topUp", 1_000), ("fuel", 1_500), ("hydInward", 3_000)] {
        engine
            .append_expense(ExpenseCmd::new(journey.id, RAVI, kind, amount))
            .await
            .unwrap();
    }
    engine.end_journey(journey.id, RAVI).await.unwrap();

    let short = engine
        .start_journey(StartJourneyCmd::new(MEENA, MEENA, fleet.van, 500))
        .await
        .unwrap();
    engine
        .append_expense(ExpenseCmd::new(short.id, MEENA, "toll", 800))
        .await
        .unwrap();
    engine.end_journey(short.id, MEENA).await.unwrap();

    let summary = engine.period_summary(ADMIN).await.unwrap();
    assert_eq!(summary.completed_journeys, 2);
    assert_eq!(summary.active_journeys, 0);
    assert_eq!(summary.total_pouch_minor, 10_500);
    assert_eq!(summary.total_top_up_minor, 1_000);
    assert_eq!(summary.total_regular_minor, 2_300);
    assert_eq!(summary.total_hyd_inward_minor, 3_000);
    assert_eq!(summary.total_deficit_minor, 300);
    assert_eq!(summary.profit_minor, 700);

    engine.archive_completed_journeys(ADMIN).await.unwrap();
    let summary = engine.period_summary(ADMIN).await.unwrap();
    assert_eq!(summary.completed_journeys, 0);
    assert_eq!(summary.profit_minor, 0);

    let denied = engine.period_summary(RAVI).await;
    assert!(matches!(denied, Err(EngineError::Forbidden(_))));
}
