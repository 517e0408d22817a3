//! Initial schema for kakeibo.
//!
//! - `users`: credentials and the current bearer token
//! - `daily_expenses`: the expense ledger
//! - `monthly_budgets`: spending target per budget month
//! - `monthly_expenses`: derived total per budget month
//!
//! Budget month keys are plain strings; neither budgets nor aggregates are
//! unique per (user, month).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    UserName,
    Password,
    Token,
}

#[derive(Iden)]
enum DailyExpenses {
    Table,
    ExpenseId,
    UserId,
    ExpenseDate,
    Amount,
}

#[derive(Iden)]
enum MonthlyBudgets {
    Table,
    Id,
    UserId,
    BudgetMonth,
    AvailableAmount,
    UpdatedAt,
}

#[derive(Iden)]
enum MonthlyExpenses {
    Table,
    Id,
    UserId,
    BudgetMonth,
    Amount,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::UserName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Token).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-token")
                    .table(Users::Table)
                    .col(Users::Token)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Daily expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DailyExpenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyExpenses::ExpenseId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyExpenses::UserId).integer().not_null())
                    .col(ColumnDef::new(DailyExpenses::ExpenseDate).date())
                    .col(
                        ColumnDef::new(DailyExpenses::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_expenses-user_id")
                            .from(DailyExpenses::Table, DailyExpenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-daily_expenses-user_id")
                    .table(DailyExpenses::Table)
                    .col(DailyExpenses::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Monthly budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyBudgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyBudgets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthlyBudgets::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyBudgets::BudgetMonth)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonthlyBudgets::AvailableAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonthlyBudgets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_budgets-user_id")
                            .from(MonthlyBudgets::Table, MonthlyBudgets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-monthly_budgets-user_id-budget_month")
                    .table(MonthlyBudgets::Table)
                    .col(MonthlyBudgets::UserId)
                    .col(MonthlyBudgets::BudgetMonth)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Monthly expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyExpenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyExpenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthlyExpenses::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyExpenses::BudgetMonth)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonthlyExpenses::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MonthlyExpenses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_expenses-user_id")
                            .from(MonthlyExpenses::Table, MonthlyExpenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-monthly_expenses-user_id-budget_month")
                    .table(MonthlyExpenses::Table)
                    .col(MonthlyExpenses::UserId)
                    .col(MonthlyExpenses::BudgetMonth)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MonthlyExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyBudgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
