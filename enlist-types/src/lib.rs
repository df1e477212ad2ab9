//! Core type definitions for Enlist.
//!
//! This crate defines the data shared by the store and the registration
//! workflow:
//! - Account identifiers (UUID v7)
//! - Accounts and their one-to-one activation records
//! - Activation tokens (40-hex SHA-1 digests, or the consumed sentinel)
//! - The activation window expiration policy

mod account;
mod expiry;
mod ids;
mod token;

pub use account::{Account, ActivationRecord, NewAccount};
pub use expiry::ActivationWindow;
pub use ids::AccountId;
pub use token::{ActivationToken, ACTIVATED_SENTINEL, TOKEN_LEN};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid activation token: {0}")]
    InvalidToken(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Truncates a timestamp to whole microseconds.
///
/// Stores persist timestamps as integer microseconds; issuing at that
/// precision keeps `date_joined` identical before and after a round trip.
#[must_use]
pub fn truncate_micros(ts: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_micros(ts.timestamp_micros()).unwrap_or(ts)
}

/// Rebuilds a timestamp from stored microseconds.
pub fn from_micros(micros: i64) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp_micros(micros).ok_or(Error::InvalidTimestamp(micros))
}
