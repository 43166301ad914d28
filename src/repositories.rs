pub mod approvals;
pub mod mining;
pub mod transactions;
pub mod users;

use crate::models::Amount;

/// Storage-level failures. Each variant is a distinct kind the presentation
/// layer can branch on; nobody parses message text.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Insufficient balance: have {available}, need {requested}")]
    InsufficientFunds {
        available: Amount,
        requested: Amount,
    },
    #[error("{0}")]
    InvalidStateTransition(String),
}
