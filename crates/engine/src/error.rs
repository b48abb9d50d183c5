//! Engine-level error types.

use store::StoreError;
use thiserror::Error;

/// Every failure the marketplace core can report.
///
/// The engine never retries: a failure is classified into one of these kinds
/// and handed back to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A referenced ad, user, category or repair request does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The write would violate a uniqueness or lifecycle rule.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller's role does not permit the operation.
    #[error("not allowed: {0}")]
    Authorization(String),

    /// The input (or the requested transition) is invalid.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The record store failed; prior state is unchanged.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::UnknownColumn(_) => Self::Validation(err.to_string()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Backend(msg) => Self::Storage(msg),
        }
    }
}
