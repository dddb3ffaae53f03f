//! Initial schema.
//!
//! - `users`: credentials, role and status of admins and drivers
//! - `vehicles`: fleet registry
//! - `journeys`: one funded trip per row, seed values never rewritten
//! - `expenses`: append-only cash log of each journey
//! - `salaries`: per-user payroll state, created lazily
//! - `salary_history`: audit trail of every paid amount change
//! - `payroll_postings`: company-level salary payouts and refunds
//! - `financial_resets`: archival runs, the latest one opens the period

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    DisplayName,
    Role,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
    Registration,
    Label,
    CreatedAt,
}

#[derive(Iden)]
enum Journeys {
    Table,
    Id,
    DriverId,
    VehicleId,
    Destination,
    PouchMinor,
    SecurityDepositMinor,
    Status,
    Archived,
    StartTime,
    EndTime,
    LastLatitude,
    LastLongitude,
    LastLocationAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    JourneyId,
    Kind,
    AmountMinor,
    Note,
    CreatedBy,
    OccurredAt,
}

#[derive(Iden)]
enum Salaries {
    Table,
    UserId,
    SalaryMinor,
    PaidMinor,
    LastUpdated,
}

#[derive(Iden)]
enum SalaryHistory {
    Table,
    Id,
    UserId,
    Kind,
    AmountMinor,
    PaidBeforeMinor,
    PaidAfterMinor,
    JourneyId,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum PayrollPostings {
    Table,
    Id,
    DriverId,
    Kind,
    AmountMinor,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum FinancialResets {
    Table,
    Id,
    RunAt,
    RunBy,
    ArchivedCount,
}

/// At most one running journey per vehicle. sea-query has no partial index
/// builder, so this one is plain SQL.
const ONE_ACTIVE_JOURNEY_PER_VEHICLE: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     \"uidx-journeys-vehicle_id-active\" ON \"journeys\" (\"vehicle_id\") \
     WHERE \"status\" = 'active' AND \"archived\" = 0";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Registration)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vehicles::Label).string())
                    .col(ColumnDef::new(Vehicles::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Journeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Journeys::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Journeys::DriverId).string().not_null())
                    .col(ColumnDef::new(Journeys::VehicleId).string().not_null())
                    .col(ColumnDef::new(Journeys::Destination).string())
                    .col(ColumnDef::new(Journeys::PouchMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Journeys::SecurityDepositMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Journeys::Status).string().not_null())
                    .col(
                        ColumnDef::new(Journeys::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Journeys::StartTime).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Journeys::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Journeys::LastLatitude).double())
                    .col(ColumnDef::new(Journeys::LastLongitude).double())
                    .col(ColumnDef::new(Journeys::LastLocationAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-journeys-driver_id")
                            .from(Journeys::Table, Journeys::DriverId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-journeys-vehicle_id")
                            .from(Journeys::Table, Journeys::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-journeys-driver_id")
                    .table(Journeys::Table)
                    .col(Journeys::DriverId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-journeys-status-archived")
                    .table(Journeys::Table)
                    .col(Journeys::Status)
                    .col(Journeys::Archived)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(ONE_ACTIVE_JOURNEY_PER_VEHICLE)
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::JourneyId).string().not_null())
                    .col(ColumnDef::new(Expenses::Kind).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Note).string())
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::OccurredAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-journey_id")
                            .from(Expenses::Table, Expenses::JourneyId)
                            .to(Journeys::Table, Journeys::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-journey_id-occurred_at")
                    .table(Expenses::Table)
                    .col(Expenses::JourneyId)
                    .col(Expenses::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Salaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Salaries::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Salaries::SalaryMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Salaries::PaidMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Salaries::LastUpdated).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-salaries-user_id")
                            .from(Salaries::Table, Salaries::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SalaryHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalaryHistory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalaryHistory::UserId).string().not_null())
                    .col(ColumnDef::new(SalaryHistory::Kind).string().not_null())
                    .col(ColumnDef::new(SalaryHistory::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(SalaryHistory::PaidBeforeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalaryHistory::PaidAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalaryHistory::JourneyId).string())
                    .col(ColumnDef::new(SalaryHistory::Note).string())
                    .col(ColumnDef::new(SalaryHistory::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(SalaryHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-salary_history-user_id")
                            .from(SalaryHistory::Table, SalaryHistory::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-salary_history-journey_id")
                            .from(SalaryHistory::Table, SalaryHistory::JourneyId)
                            .to(Journeys::Table, Journeys::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-salary_history-user_id-created_at")
                    .table(SalaryHistory::Table)
                    .col(SalaryHistory::UserId)
                    .col(SalaryHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PayrollPostings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayrollPostings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PayrollPostings::DriverId).string().not_null())
                    .col(ColumnDef::new(PayrollPostings::Kind).string().not_null())
                    .col(
                        ColumnDef::new(PayrollPostings::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PayrollPostings::Note).string())
                    .col(ColumnDef::new(PayrollPostings::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(PayrollPostings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payroll_postings-driver_id")
                            .from(PayrollPostings::Table, PayrollPostings::DriverId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payroll_postings-created_at")
                    .table(PayrollPostings::Table)
                    .col(PayrollPostings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinancialResets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialResets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialResets::RunAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialResets::RunBy).string().not_null())
                    .col(
                        ColumnDef::new(FinancialResets::ArchivedCount)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialResets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PayrollPostings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalaryHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Salaries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Journeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
