//! Persistence gateway error taxonomy.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// Unique-constraint collision. Recognized explicitly so callers can
    /// treat it as an idempotency signal rather than a hard failure (§7).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Wraps an error from a sibling crate (e.g. the queue adapter)
    /// raised inside a `with_tx` closure, so the transaction still
    /// rolls back on it without this crate depending on theirs.
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Is this sqlx error a unique-violation? Postgres reports SQLSTATE
    /// 23505; detection is driver-specific per §9.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
            _ => false,
        }
    }

    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if Self::is_unique_violation(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}
