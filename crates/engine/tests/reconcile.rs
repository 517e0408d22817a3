use std::sync::atomic::{AtomicBool, Ordering};

use api_types::{
    expense::DailyExpense,
    monthly_expense::{MonthlyExpense, MonthlyExpenseUpsert},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use engine::{AbsentAggregate, BudgetMonth, Ledger, ReconcileError, Reconciler, SyncOutcome};

#[derive(Debug, thiserror::Error)]
#[error("ledger offline")]
struct Offline;

#[derive(Default)]
struct State {
    expenses: Vec<DailyExpense>,
    aggregates: Vec<MonthlyExpense>,
    next_id: i64,
}

/// In-memory ledger. Every call yields once so concurrent syncs interleave.
#[derive(Default)]
struct MemoryLedger {
    state: Mutex<State>,
    offline: AtomicBool,
}

impl MemoryLedger {
    async fn add_expense(&self, date: (i32, u32, u32), amount: i64) -> DailyExpense {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let expense = DailyExpense {
            expense_id: state.next_id,
            user_id: 1,
            expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            amount,
        };
        state.expenses.push(expense.clone());
        expense
    }

    async fn remove_expense(&self, expense_id: i64) {
        let mut state = self.state.lock().await;
        state.expenses.retain(|e| e.expense_id != expense_id);
    }

    async fn seed_aggregate(&self, month: &str, amount: i64) -> i64 {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = state.next_id;
        state.aggregates.push(MonthlyExpense {
            id: Some(id),
            user_id: 1,
            budget_month: month.to_string(),
            amount,
            updated_at: None,
        });
        id
    }

    async fn aggregates(&self) -> Vec<MonthlyExpense> {
        self.state.lock().await.aggregates.clone()
    }

    fn check_online(&self) -> Result<(), Offline> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Offline);
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    type Error = Offline;

    async fn list_expenses(&self, user_id: i64) -> Result<Vec<DailyExpense>, Offline> {
        self.check_online()?;
        let expenses = self
            .state
            .lock()
            .await
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        tokio::task::yield_now().await;
        Ok(expenses)
    }

    async fn list_monthly_expenses(
        &self,
        user_id: i64,
        budget_month: Option<&str>,
    ) -> Result<Vec<MonthlyExpense>, Offline> {
        self.check_online()?;
        let records = self
            .state
            .lock()
            .await
            .aggregates
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| budget_month.is_none_or(|m| r.budget_month == m))
            .cloned()
            .collect();
        tokio::task::yield_now().await;
        Ok(records)
    }

    async fn create_monthly_expense(
        &self,
        payload: &MonthlyExpenseUpsert,
    ) -> Result<MonthlyExpense, Offline> {
        self.check_online()?;
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let record = MonthlyExpense {
            id: Some(state.next_id),
            user_id: payload.user_id,
            budget_month: payload.budget_month.clone(),
            amount: payload.amount,
            updated_at: None,
        };
        state.aggregates.push(record.clone());
        Ok(record)
    }

    async fn update_monthly_expense(
        &self,
        id: i64,
        payload: &MonthlyExpenseUpsert,
    ) -> Result<MonthlyExpense, Offline> {
        self.check_online()?;
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        let record = state
            .aggregates
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(Offline)?;
        record.budget_month = payload.budget_month.clone();
        record.amount = payload.amount;
        Ok(record.clone())
    }
}

fn january() -> BudgetMonth {
    BudgetMonth::new(2025, 1).unwrap()
}

#[tokio::test]
async fn recompute_persists_exact_month_sum() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    ledger.add_expense((2025, 1, 1), 120).await;
    ledger.add_expense((2025, 1, 15), 380).await;
    ledger.add_expense((2025, 1, 31), 7).await;
    ledger.add_expense((2025, 2, 1), 10_000).await;
    ledger.add_expense((2024, 1, 10), 10_000).await;

    let outcome = reconciler.recompute_and_sync(1, january()).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Created { amount: 507, .. }));
    let aggregates = reconciler.ledger().aggregates().await;
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].budget_month, "2025-01");
    assert_eq!(aggregates[0].amount, 507);
}

#[tokio::test]
async fn recompute_updates_existing_aggregate() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let id = ledger.seed_aggregate("2025-01", 1).await;
    ledger.add_expense((2025, 1, 5), 500).await;

    let outcome = reconciler.recompute_and_sync(1, january()).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Updated { id, amount: 500 });
    let aggregates = reconciler.ledger().aggregates().await;
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].amount, 500);
}

#[tokio::test]
async fn recompute_normalizes_legacy_month_key() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let id = ledger.seed_aggregate("2025-1", 0).await;
    ledger.add_expense((2025, 1, 5), 500).await;

    reconciler.recompute_and_sync(1, january()).await.unwrap();

    let aggregates = reconciler.ledger().aggregates().await;
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].id, Some(id));
    assert_eq!(aggregates[0].budget_month, "2025-01");
    assert_eq!(aggregates[0].amount, 500);
}

#[tokio::test]
async fn empty_month_creates_zero_aggregate_by_default() {
    let reconciler = Reconciler::new(MemoryLedger::default());

    let outcome = reconciler.recompute_and_sync(1, january()).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Created { amount: 0, .. }));
    assert_eq!(reconciler.ledger().aggregates().await.len(), 1);
}

#[tokio::test]
async fn empty_month_is_skipped_with_skip_policy() {
    let reconciler =
        Reconciler::new(MemoryLedger::default()).with_policy(AbsentAggregate::SkipWhenZero);

    let outcome = reconciler.recompute_and_sync(1, january()).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert!(reconciler.ledger().aggregates().await.is_empty());
}

#[tokio::test]
async fn deletion_subtracts_from_prior_aggregate() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    // The prior aggregate is authoritative: T - a, without re-reading the ledger.
    let id = ledger.seed_aggregate("2025-01", 1500).await;
    let expense = ledger.add_expense((2025, 1, 20), 400).await;
    ledger.remove_expense(expense.expense_id).await;

    let outcome = reconciler.apply_deletion(&expense).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Updated { id, amount: 1100 });
}

#[tokio::test]
async fn deletion_without_aggregate_recomputes() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    ledger.add_expense((2025, 1, 3), 250).await;
    let expense = ledger.add_expense((2025, 1, 4), 400).await;
    ledger.remove_expense(expense.expense_id).await;

    let outcome = reconciler.apply_deletion(&expense).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Created { amount: 250, .. }));
}

#[tokio::test]
async fn deletion_with_stale_aggregate_recomputes() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let id = ledger.seed_aggregate("2025-01", 100).await;
    ledger.add_expense((2025, 1, 3), 250).await;
    let expense = ledger.add_expense((2025, 1, 4), 400).await;
    ledger.remove_expense(expense.expense_id).await;

    let outcome = reconciler.apply_deletion(&expense).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Updated { id, amount: 250 });
}

#[tokio::test]
async fn deletion_of_undated_expense_is_skipped() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let expense = DailyExpense {
        expense_id: 9,
        user_id: 1,
        expense_date: None,
        amount: 100,
    };

    let outcome = reconciler.apply_deletion(&expense).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert!(reconciler.ledger().aggregates().await.is_empty());
}

#[tokio::test]
async fn deletion_rejects_negative_amount() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let expense = DailyExpense {
        expense_id: 9,
        user_id: 1,
        expense_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        amount: -5,
    };

    let err = reconciler.apply_deletion(&expense).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Engine(_)));
}

#[tokio::test]
async fn concurrent_deletions_do_not_lose_updates() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let id = ledger.seed_aggregate("2025-01", 600).await;
    let first = ledger.add_expense((2025, 1, 1), 100).await;
    let second = ledger.add_expense((2025, 1, 2), 200).await;
    ledger.add_expense((2025, 1, 3), 300).await;
    ledger.remove_expense(first.expense_id).await;
    ledger.remove_expense(second.expense_id).await;

    let (a, b) = tokio::join!(
        reconciler.apply_deletion(&first),
        reconciler.apply_deletion(&second)
    );
    a.unwrap();
    b.unwrap();

    let aggregates = reconciler.ledger().aggregates().await;
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].id, Some(id));
    assert_eq!(aggregates[0].amount, 300);
}

#[tokio::test]
async fn create_waits_for_a_deletion_and_its_sync() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let first = ledger.add_expense((2025, 1, 1), 100).await;
    ledger.add_expense((2025, 1, 2), 200).await;
    reconciler.recompute_and_sync(1, january()).await.unwrap();

    // The create is polled while the deletion still holds the month: it must
    // not recompute between the removal and the `T - a` write.
    let (removed, created) = tokio::join!(
        reconciler.remove_and_sync(&first, async {
            ledger.remove_expense(first.expense_id).await;
            tokio::task::yield_now().await;
            Ok::<_, Offline>(())
        }),
        reconciler.record_and_sync(1, january(), async {
            Ok::<_, Offline>(ledger.add_expense((2025, 1, 10), 50).await)
        })
    );
    assert!(removed.unwrap().is_ok());
    let (_, sync) = created.unwrap();
    assert!(sync.is_ok());

    let aggregates = reconciler.ledger().aggregates().await;
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].amount, 250);
}

#[tokio::test]
async fn failed_removal_skips_the_sync() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let id = ledger.seed_aggregate("2025-01", 300).await;
    let expense = ledger.add_expense((2025, 1, 1), 100).await;

    let result = reconciler
        .remove_and_sync(&expense, async { Err::<(), _>(Offline) })
        .await;

    assert!(result.is_err());
    let aggregates = reconciler.ledger().aggregates().await;
    assert_eq!(aggregates[0].id, Some(id));
    assert_eq!(aggregates[0].amount, 300);
}

#[tokio::test]
async fn negative_expense_is_removed_but_not_synced() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    let ledger = reconciler.ledger();
    let expense = ledger.add_expense((2025, 1, 1), -5).await;

    let sync = reconciler
        .remove_and_sync(&expense, async {
            ledger.remove_expense(expense.expense_id).await;
            Ok::<_, Offline>(())
        })
        .await
        .unwrap();

    assert!(matches!(sync, Err(ReconcileError::Engine(_))));
    assert!(ledger.list_expenses(1).await.unwrap().is_empty());
    assert!(reconciler.ledger().aggregates().await.is_empty());
}

#[tokio::test]
async fn ledger_failure_is_reported_and_nothing_is_written() {
    let reconciler = Reconciler::new(MemoryLedger::default());
    reconciler.ledger().add_expense((2025, 1, 1), 100).await;
    reconciler.ledger().offline.store(true, Ordering::SeqCst);

    let err = reconciler.recompute_and_sync(1, january()).await.unwrap_err();

    assert!(err.ledger().is_some());
    reconciler.ledger().offline.store(false, Ordering::SeqCst);
    assert!(reconciler.ledger().aggregates().await.is_empty());
}
