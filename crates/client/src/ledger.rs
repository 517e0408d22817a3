//! Expense ledger operations that keep the monthly aggregate in sync.

use api_types::{
    expense::{DailyExpense, ExpenseNew},
    monthly_expense::MonthlyExpense,
};
use chrono::NaiveDate;
use engine::{AbsentAggregate, BudgetMonth, ReconcileError, Reconciler, SyncOutcome};

use crate::{
    ApiClient,
    error::{ClientError, Result},
};

pub type SyncResult = std::result::Result<SyncOutcome, ReconcileError<ClientError>>;

/// A completed ledger mutation together with the aggregate sync that followed.
///
/// The mutation is never rolled back when the sync fails.
#[derive(Debug)]
pub struct LedgerUpdate<T> {
    pub record: T,
    pub sync: SyncResult,
}

impl<T> LedgerUpdate<T> {
    /// Message to show when the aggregate could not be synced.
    pub fn sync_warning(&self) -> Option<String> {
        match &self.sync {
            Ok(_) => None,
            Err(ReconcileError::Ledger(err)) => Some(format!(
                "Saved, but the monthly total was not updated: {}",
                err.user_message()
            )),
            Err(err) => Some(format!("Saved, but the monthly total was not updated: {err}")),
        }
    }
}

pub struct LedgerClient {
    reconciler: Reconciler<ApiClient>,
}

impl LedgerClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            reconciler: Reconciler::new(api),
        }
    }

    #[must_use]
    pub fn with_policy(self, policy: AbsentAggregate) -> Self {
        Self {
            reconciler: self.reconciler.with_policy(policy),
        }
    }

    pub fn api(&self) -> &ApiClient {
        self.reconciler.ledger()
    }

    pub async fn list_expenses(&self, user_id: i64) -> Result<Vec<DailyExpense>> {
        self.api().list_expenses(user_id).await
    }

    /// Records an expense, then recomputes the aggregate of its month (the
    /// current month for an undated expense).
    pub async fn create_expense(
        &self,
        user_id: i64,
        expense_date: Option<NaiveDate>,
        amount: i64,
    ) -> Result<LedgerUpdate<DailyExpense>> {
        let amount = engine::validate_amount(amount)?;
        let payload = ExpenseNew {
            user_id,
            expense_date,
            amount,
        };
        let month = expense_date.map_or_else(BudgetMonth::current, BudgetMonth::from_date);
        let (created, sync) = self
            .reconciler
            .record_and_sync(user_id, month, self.api().create_expense(&payload))
            .await?;
        tracing::info!(
            user_id,
            expense_id = created.expense_id,
            amount,
            "expense created"
        );

        log_sync(&sync, user_id, month);
        Ok(LedgerUpdate {
            record: created,
            sync,
        })
    }

    /// Deletes an expense, then subtracts it from its month's aggregate.
    ///
    /// The amount is checked only for the sync, so a stored record with a
    /// negative amount can still be deleted.
    pub async fn delete_expense(&self, expense: &DailyExpense) -> Result<LedgerUpdate<i64>> {
        let sync = self
            .reconciler
            .remove_and_sync(expense, self.api().delete_expense(expense.expense_id))
            .await?;
        tracing::info!(
            user_id = expense.user_id,
            expense_id = expense.expense_id,
            "expense deleted"
        );

        if let Some(date) = expense.expense_date {
            log_sync(&sync, expense.user_id, BudgetMonth::from_date(date));
        }
        Ok(LedgerUpdate {
            record: expense.expense_id,
            sync,
        })
    }

    /// Aggregate recorded for `month`, matching legacy keys too.
    pub async fn monthly_expense(
        &self,
        user_id: i64,
        month: BudgetMonth,
    ) -> Result<Option<MonthlyExpense>> {
        let records = self.api().list_monthly_expenses(user_id, None).await?;
        Ok(engine::select_for_month(&records, month).cloned())
    }
}

fn log_sync(sync: &SyncResult, user_id: i64, month: BudgetMonth) {
    match sync {
        Ok(outcome) => tracing::debug!(user_id, month = %month, ?outcome, "aggregate synced"),
        Err(err) => tracing::error!(user_id, month = %month, "aggregate sync failed: {err}"),
    }
}
