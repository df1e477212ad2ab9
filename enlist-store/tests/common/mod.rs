//! Shared test helpers for store tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use enlist_store::{AccountStore, MemoryStore, SqliteStore};
use enlist_types::{Account, ActivationToken, NewAccount};

/// Fixed reference instant used as "now" throughout the store tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap()
}

/// Cutoff for a 7-day window at [`now`].
pub fn week_cutoff() -> DateTime<Utc> {
    now() - Duration::days(7)
}

pub fn new_account(username: &str, joined: DateTime<Utc>) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "correct horse".to_string(),
        date_joined: joined,
    }
}

/// Creates an inactive account joined at `joined`, returning it with its token.
pub fn seed(
    store: &dyn AccountStore,
    username: &str,
    joined: DateTime<Utc>,
) -> (Account, ActivationToken) {
    let token = ActivationToken::generate(username);
    let account = store
        .create_inactive(new_account(username, joined), &token)
        .unwrap();
    (account, token)
}

/// Both store implementations, labelled for assertion messages.
pub fn stores() -> Vec<(&'static str, Box<dyn AccountStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::open_in_memory().unwrap())),
    ]
}
