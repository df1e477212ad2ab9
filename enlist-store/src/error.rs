//! Error types for the identity store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Input or stored data violates an invariant.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The store cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored value failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] enlist_types::Error),
}

impl StoreError {
    /// Maps SQLite constraint violations to [`StoreError::Conflict`].
    pub(crate) fn from_write(err: rusqlite::Error, what: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(format!("{what} already exists"))
            }
            _ => Self::Database(err),
        }
    }
}
