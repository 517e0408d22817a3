//! Household budget core.
//!
//! The crate owns the rules that keep the monthly expense aggregate consistent
//! with the daily expense ledger, and the small derived figures shown to the
//! user (monthly totals, per-day allowance). It talks to storage only through
//! the [`Ledger`] trait.

pub use allowance::{compute_daily_allowance, daily_allowance_on};
pub use error::{EngineError, ReconcileError};
pub use ledger::{Ledger, ledger_total, month_total};
pub use month::BudgetMonth;
pub use reconcile::{AbsentAggregate, Reconciler, SyncOutcome};
pub use select::{MonthRecord, select_current_month_record, select_for_month};

mod allowance;
mod error;
mod ledger;
mod month;
mod reconcile;
mod select;

/// Validates an amount entered for an expense or a budget.
pub fn validate_amount(amount: i64) -> Result<i64, EngineError> {
    if amount < 0 {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be >= 0, got {amount}"
        )));
    }
    Ok(amount)
}
