//! Typed error type for the db crate.

use store::StoreError;
use thiserror::Error;

/// Postgres error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("no such column: {0}")]
    UnknownColumn(String),

    /// A stored value could not be mapped onto a domain type.
    #[error("corrupt row: {0}")]
    Decode(String),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => StoreError::NotFound(what),
            DbError::UnknownColumn(column) => StoreError::UnknownColumn(column),
            DbError::Sqlx(sqlx::Error::RowNotFound) => StoreError::NotFound("row".into()),
            DbError::Sqlx(sqlx::Error::Database(ref db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                StoreError::Conflict(db_err.message().to_owned())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}
