//! Identity store for Enlist.
//!
//! Holds accounts and their activation records. Two implementations share
//! the [`AccountStore`] contract:
//!
//! - [`SqliteStore`]: persistent, backed by a single SQLite file
//! - [`MemoryStore`]: process-local, for tests and dry runs
//!
//! # Atomicity
//!
//! Every mutating operation is a single guarded write. Creation inserts the
//! account and its record in one transaction. Activation and purge deletion
//! re-check the token and expiry cutoff inside the write, so a token can be
//! consumed by at most one caller and an account activated concurrently
//! with a purge is never deleted.

mod credential;
mod error;
mod memory;
mod sqlite;

pub use credential::{make_credential, verify_credential};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use enlist_types::{Account, AccountId, ActivationRecord, ActivationToken, NewAccount};

/// Storage contract for accounts and activation records.
pub trait AccountStore: Send + Sync {
    /// Creates an inactive account together with its activation record.
    ///
    /// The password is converted with [`make_credential`] before it is kept.
    /// Fails with [`StoreError::Conflict`] if the username (compared
    /// case-insensitively) or the token is already taken; nothing is
    /// written in that case.
    fn create_inactive(&self, new: NewAccount, token: &ActivationToken) -> StoreResult<Account>;

    /// Loads an account by id.
    fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Looks up the record holding exactly `token`.
    fn find_record(&self, token: &ActivationToken) -> StoreResult<Option<ActivationRecord>>;

    /// Consumes `token` if its account joined strictly after `cutoff`.
    ///
    /// In one atomic step: marks the account active and replaces the token
    /// with the sentinel. Returns the activated account, or `None` if no
    /// live record matched.
    fn activate(
        &self,
        token: &ActivationToken,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Option<Account>>;

    /// Returns every activation record, oldest first.
    fn records(&self) -> StoreResult<Vec<ActivationRecord>>;

    /// Deletes an account and its record if it is still inactive and its
    /// token is the sentinel or was issued at or before `cutoff`.
    ///
    /// Returns true if the account was deleted.
    fn delete_expired(&self, id: AccountId, cutoff: DateTime<Utc>) -> StoreResult<bool>;

    /// Returns true if the username is taken, ignoring case.
    fn username_exists(&self, username: &str) -> StoreResult<bool>;

    /// Returns true if any account uses this email, ignoring case.
    fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// Returns active accounts with this email, ignoring case.
    fn find_active_by_email(&self, email: &str) -> StoreResult<Vec<Account>>;
}

/// Rejects an account the store must never hold.
fn validate_new(new: &NewAccount) -> StoreResult<()> {
    if new.username.trim().is_empty() {
        return Err(StoreError::InvalidData("username is required".into()));
    }
    if new.email.trim().is_empty() {
        return Err(StoreError::InvalidData("email is required".into()));
    }
    Ok(())
}

/// Rejects the sentinel as a token to store or consume.
fn require_live(token: &ActivationToken) -> StoreResult<()> {
    if token.is_activated() {
        return Err(StoreError::InvalidData(
            "the activated sentinel is not a live token".into(),
        ));
    }
    Ok(())
}
