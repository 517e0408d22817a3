//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidMonth`] thrown when a budget month key cannot be parsed.
//! - [`InvalidAmount`] thrown when an amount breaks the ledger rules.
//! - [`ReconcileError`] wraps the above together with the error of the
//!   [`Ledger`] the reconciliation talks to.
//!
//!  [`InvalidMonth`]: EngineError::InvalidMonth
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Ledger`]: crate::Ledger
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid budget month: {0}")]
    InvalidMonth(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Error of a reconciliation run.
///
/// `E` is the error type of the ledger backend.
#[derive(Error, Debug)]
pub enum ReconcileError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Ledger(E),
}

impl<E> ReconcileError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the ledger error, if the failure came from the backend.
    pub fn ledger(&self) -> Option<&E> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Engine(_) => None,
        }
    }
}
