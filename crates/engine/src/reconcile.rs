//! Keeps the monthly aggregate records in sync with the expense ledger.
//!
//! Every create or delete of a dated expense must be followed by a sync of the
//! aggregate of that expense's month. Syncs for the same (user, month) run one
//! at a time: each one reads the current aggregate and writes a new value, so
//! two overlapping runs would otherwise lose one of the updates.
//! [`Reconciler::record_and_sync`] and [`Reconciler::remove_and_sync`] also
//! hold that lock across the ledger write itself, so a deletion's `T - a` is
//! never applied to a total that already excludes the deleted expense.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
};

use api_types::{
    expense::DailyExpense,
    monthly_expense::{MonthlyExpense, MonthlyExpenseUpsert},
};

use crate::{BudgetMonth, EngineError, Ledger, ReconcileError, ledger::month_total, select_for_month};

type ResultReconcile<T, L> = Result<T, ReconcileError<<L as Ledger>::Error>>;

/// What to do when a month has no aggregate record yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AbsentAggregate {
    /// Always create the record, even with a zero total.
    #[default]
    Create,
    /// Create the record only when the total is greater than zero.
    SkipWhenZero,
}

/// Result of one sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Created { id: Option<i64>, amount: i64 },
    Updated { id: i64, amount: i64 },
    /// Nothing was written.
    Skipped,
}

impl SyncOutcome {
    /// Amount persisted by the sync, if any.
    #[must_use]
    pub fn amount(&self) -> Option<i64> {
        match self {
            Self::Created { amount, .. } | Self::Updated { amount, .. } => Some(*amount),
            Self::Skipped => None,
        }
    }
}

type LockKey = (i64, BudgetMonth);

pub struct Reconciler<L> {
    ledger: L,
    policy: AbsentAggregate,
    locks: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl<L: Ledger> Reconciler<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            policy: AbsentAggregate::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AbsentAggregate) -> Self {
        self.policy = policy;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Recomputes the total of `month` from the whole ledger and persists it.
    ///
    /// The existing aggregate is updated; a missing one is created according
    /// to the [`AbsentAggregate`] policy.
    pub async fn recompute_and_sync(
        &self,
        user_id: i64,
        month: BudgetMonth,
    ) -> ResultReconcile<SyncOutcome, L> {
        self.serialized(user_id, month, self.recompute_locked(user_id, month))
            .await
    }

    /// Runs `create` and the recompute of `month` under the month's lock, so
    /// no other sync of that month sees the ledger between the two.
    ///
    /// An error from `create` is returned as is and nothing is synced.
    pub async fn record_and_sync<T, E, F>(
        &self,
        user_id: i64,
        month: BudgetMonth,
        create: F,
    ) -> Result<(T, ResultReconcile<SyncOutcome, L>), E>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.serialized(user_id, month, async {
            let record = create.await?;
            let sync = self.recompute_locked(user_id, month).await;
            Ok::<_, E>((record, sync))
        })
        .await
    }

    /// Syncs the aggregate after `deleted` was removed from the ledger.
    ///
    /// The new total is the prior aggregate minus the deleted amount. When no
    /// usable prior aggregate exists, or it is smaller than the deleted amount,
    /// the month is recomputed from the ledger instead. Undated expenses belong
    /// to no month, so nothing is synced for them.
    pub async fn apply_deletion(&self, deleted: &DailyExpense) -> ResultReconcile<SyncOutcome, L> {
        let Some(month) = deletion_month(deleted) else {
            return check_deleted(deleted).map(|()| SyncOutcome::Skipped);
        };
        self.serialized(deleted.user_id, month, self.deletion_locked(deleted, month))
            .await
    }

    /// Runs `remove` and the deletion sync under the lock of the deleted
    /// expense's month.
    ///
    /// The removal happens even when `deleted` cannot be synced (negative
    /// amount); that failure is reported in the sync result.
    pub async fn remove_and_sync<E, F>(
        &self,
        deleted: &DailyExpense,
        remove: F,
    ) -> Result<ResultReconcile<SyncOutcome, L>, E>
    where
        F: Future<Output = Result<(), E>>,
    {
        let Some(month) = deletion_month(deleted) else {
            remove.await?;
            return Ok(check_deleted(deleted).map(|()| SyncOutcome::Skipped));
        };
        self.serialized(deleted.user_id, month, async {
            remove.await?;
            Ok::<_, E>(self.deletion_locked(deleted, month).await)
        })
        .await
    }

    async fn deletion_locked(
        &self,
        deleted: &DailyExpense,
        month: BudgetMonth,
    ) -> ResultReconcile<SyncOutcome, L> {
        check_deleted(deleted)?;
        let user_id = deleted.user_id;
        match self.find_aggregate(user_id, month).await? {
            Some(existing) if existing.id.is_some() && existing.amount >= deleted.amount => {
                let total = existing.amount - deleted.amount;
                self.write_total(user_id, month, Some(existing), total).await
            }
            _ => {
                tracing::debug!(
                    user_id,
                    month = %month,
                    "no usable aggregate for deletion, recomputing"
                );
                self.recompute_locked(user_id, month).await
            }
        }
    }

    /// Awaits `work` while holding the (user, month) lock.
    async fn serialized<F: Future>(&self, user_id: i64, month: BudgetMonth, work: F) -> F::Output {
        let key = (user_id, month);
        let lock = self.lock_for(key);
        let output = {
            let _guard = lock.lock().await;
            work.await
        };
        self.release(key, lock);
        output
    }

    async fn recompute_locked(
        &self,
        user_id: i64,
        month: BudgetMonth,
    ) -> ResultReconcile<SyncOutcome, L> {
        let expenses = self
            .ledger
            .list_expenses(user_id)
            .await
            .map_err(ReconcileError::Ledger)?;
        let total = month_total(&expenses, month);
        let existing = self.find_aggregate(user_id, month).await?;
        self.write_total(user_id, month, existing, total).await
    }

    /// Aggregates are listed without a month filter and matched on the
    /// normalized key, so records stored under `YYYY-M` are found too.
    async fn find_aggregate(
        &self,
        user_id: i64,
        month: BudgetMonth,
    ) -> ResultReconcile<Option<MonthlyExpense>, L> {
        let records = self
            .ledger
            .list_monthly_expenses(user_id, None)
            .await
            .map_err(ReconcileError::Ledger)?;
        Ok(select_for_month(&records, month).cloned())
    }

    async fn write_total(
        &self,
        user_id: i64,
        month: BudgetMonth,
        existing: Option<MonthlyExpense>,
        total: i64,
    ) -> ResultReconcile<SyncOutcome, L> {
        let payload = MonthlyExpenseUpsert {
            user_id,
            budget_month: month.to_string(),
            amount: total,
        };

        match existing.and_then(|record| record.id) {
            Some(id) => {
                self.ledger
                    .update_monthly_expense(id, &payload)
                    .await
                    .map_err(ReconcileError::Ledger)?;
                tracing::debug!(user_id, month = %month, id, total, "monthly expense updated");
                Ok(SyncOutcome::Updated { id, amount: total })
            }
            None if total == 0 && self.policy == AbsentAggregate::SkipWhenZero => {
                Ok(SyncOutcome::Skipped)
            }
            None => {
                let created = self
                    .ledger
                    .create_monthly_expense(&payload)
                    .await
                    .map_err(ReconcileError::Ledger)?;
                tracing::debug!(user_id, month = %month, total, "monthly expense created");
                Ok(SyncOutcome::Created {
                    id: created.id,
                    amount: total,
                })
            }
        }
    }

    fn lock_for(&self, key: LockKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());
        locks.entry(key).or_default().clone()
    }

    /// Drops the lock entry once nobody else is waiting on it.
    fn release(&self, key: LockKey, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());
        drop(lock);
        if locks
            .get(&key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&key);
        }
    }
}

fn deletion_month(deleted: &DailyExpense) -> Option<BudgetMonth> {
    let month = deleted.expense_date.map(BudgetMonth::from_date);
    if month.is_none() {
        tracing::debug!(expense_id = deleted.expense_id, "undated expense, no aggregate to sync");
    }
    month
}

fn check_deleted<E: std::error::Error + 'static>(deleted: &DailyExpense) -> Result<(), ReconcileError<E>> {
    if deleted.amount < 0 {
        return Err(EngineError::InvalidAmount(format!(
            "expense {} has negative amount {}",
            deleted.expense_id, deleted.amount
        ))
        .into());
    }
    Ok(())
}
