//! Store-level error type.

use thiserror::Error;

/// Errors returned by a [`RecordStore`](crate::RecordStore) implementation.
///
/// Backends translate their driver errors into one of these variants so the
/// engine can classify failures without knowing which store it runs on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced record does not exist (or is hidden from the caller).
    #[error("{0} not found")]
    NotFound(String),

    /// A sort or filter referenced a column the ads table does not have.
    #[error("no such column: {0}")]
    UnknownColumn(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend itself failed (connection, timeout, driver error).
    #[error("storage backend error: {0}")]
    Backend(String),
}
