use api_types::{
    expense::DailyExpense,
    monthly_expense::{MonthlyExpense, MonthlyExpenseUpsert},
};
use async_trait::async_trait;

use crate::BudgetMonth;

/// Persistence backend seen by the reconciliation.
///
/// The HTTP client implements it against the remote API; tests use in-memory
/// implementations.
#[async_trait]
pub trait Ledger: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All expenses of `user_id`, any month.
    async fn list_expenses(&self, user_id: i64) -> Result<Vec<DailyExpense>, Self::Error>;

    /// Monthly aggregates of `user_id`, optionally narrowed to a month key.
    async fn list_monthly_expenses(
        &self,
        user_id: i64,
        budget_month: Option<&str>,
    ) -> Result<Vec<MonthlyExpense>, Self::Error>;

    async fn create_monthly_expense(
        &self,
        payload: &MonthlyExpenseUpsert,
    ) -> Result<MonthlyExpense, Self::Error>;

    async fn update_monthly_expense(
        &self,
        id: i64,
        payload: &MonthlyExpenseUpsert,
    ) -> Result<MonthlyExpense, Self::Error>;
}

/// Sum of the expenses dated inside `month`. Undated expenses are ignored.
#[must_use]
pub fn month_total(expenses: &[DailyExpense], month: BudgetMonth) -> i64 {
    expenses
        .iter()
        .filter(|expense| expense.expense_date.is_some_and(|date| month.contains(date)))
        .map(|expense| expense.amount)
        .sum()
}

/// Sum of all the given expenses.
#[must_use]
pub fn ledger_total(expenses: &[DailyExpense]) -> i64 {
    expenses.iter().map(|expense| expense.amount).sum()
}
