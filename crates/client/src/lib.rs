//! HTTP client for the kakeibo persistence API.
//!
//! [`ApiClient`] holds the connection pool and the shared [`SessionContext`].
//! The higher level [`LedgerClient`] and [`BudgetClient`] build on it; the
//! ledger client also keeps the monthly aggregates reconciled.

pub use api::ApiClient;
pub use budgets::BudgetClient;
pub use error::{ClientError, Result};
pub use ledger::{LedgerClient, LedgerUpdate, SyncResult};
pub use session::{Session, SessionContext, SessionStore, SessionUser};

mod api;
mod budgets;
pub mod error;
mod expenses;
mod ledger;
pub mod session;
mod users;
