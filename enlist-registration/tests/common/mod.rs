//! Shared test helpers for registration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use enlist_registration::{
    Email, MailError, Mailer, ManualClock, MemoryMailer, RegistrationConfig, RegistrationService,
};
use enlist_store::{AccountStore, MemoryStore, StoreError, StoreResult};
use enlist_types::{Account, AccountId, ActivationRecord, ActivationToken, NewAccount};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const WINDOW_DAYS: u32 = 7;

/// Instant the test clock starts at.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap()
}

pub fn config() -> RegistrationConfig {
    RegistrationConfig {
        activation_days: WINDOW_DAYS,
        from_email: "noreply@example.com".into(),
        site: "example.com".into(),
        ..RegistrationConfig::default()
    }
}

/// A service wired to in-memory collaborators.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<MemoryMailer>,
    pub clock: Arc<ManualClock>,
    pub service: RegistrationService,
}

pub fn harness() -> Harness {
    harness_with(config())
}

pub fn harness_with(config: RegistrationConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(MemoryMailer::new());
    let clock = Arc::new(ManualClock::new(start()));
    let service = RegistrationService::new(config, store.clone(), mailer.clone())
        .with_clock(clock.clone());
    Harness {
        store,
        mailer,
        clock,
        service,
    }
}

/// Pulls the 40-hex activation key out of an email body.
pub fn key_from(email: &Email) -> String {
    email
        .body
        .split_whitespace()
        .find(|word| ActivationToken::is_digest(word))
        .expect("activation key in email body")
        .to_string()
}

/// Mailer that always fails.
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _: &Email) -> Result<(), MailError> {
        Err(MailError::Rejected("relay unreachable".into()))
    }
}

/// Wraps a store and counts every call made through it.
pub struct CountingStore<S> {
    pub inner: S,
    calls: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: AccountStore> AccountStore for CountingStore<S> {
    fn create_inactive(&self, new: NewAccount, token: &ActivationToken) -> StoreResult<Account> {
        self.tick();
        self.inner.create_inactive(new, token)
    }

    fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        self.tick();
        self.inner.get_account(id)
    }

    fn find_record(&self, token: &ActivationToken) -> StoreResult<Option<ActivationRecord>> {
        self.tick();
        self.inner.find_record(token)
    }

    fn activate(
        &self,
        token: &ActivationToken,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Option<Account>> {
        self.tick();
        self.inner.activate(token, cutoff)
    }

    fn records(&self) -> StoreResult<Vec<ActivationRecord>> {
        self.tick();
        self.inner.records()
    }

    fn delete_expired(&self, id: AccountId, cutoff: DateTime<Utc>) -> StoreResult<bool> {
        self.tick();
        self.inner.delete_expired(id, cutoff)
    }

    fn username_exists(&self, username: &str) -> StoreResult<bool> {
        self.tick();
        self.inner.username_exists(username)
    }

    fn email_exists(&self, email: &str) -> StoreResult<bool> {
        self.tick();
        self.inner.email_exists(email)
    }

    fn find_active_by_email(&self, email: &str) -> StoreResult<Vec<Account>> {
        self.tick();
        self.inner.find_active_by_email(email)
    }
}

/// Wraps a store and fails deletions for selected accounts, or listing.
pub struct FaultyStore<S> {
    pub inner: S,
    pub fail_delete: Mutex<HashSet<AccountId>>,
    pub fail_records: bool,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_delete: Mutex::new(HashSet::new()),
            fail_records: false,
        }
    }
}

impl<S: AccountStore> AccountStore for FaultyStore<S> {
    fn create_inactive(&self, new: NewAccount, token: &ActivationToken) -> StoreResult<Account> {
        self.inner.create_inactive(new, token)
    }

    fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        self.inner.get_account(id)
    }

    fn find_record(&self, token: &ActivationToken) -> StoreResult<Option<ActivationRecord>> {
        self.inner.find_record(token)
    }

    fn activate(
        &self,
        token: &ActivationToken,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Option<Account>> {
        self.inner.activate(token, cutoff)
    }

    fn records(&self) -> StoreResult<Vec<ActivationRecord>> {
        if self.fail_records {
            return Err(StoreError::Unavailable("database offline".into()));
        }
        self.inner.records()
    }

    fn delete_expired(&self, id: AccountId, cutoff: DateTime<Utc>) -> StoreResult<bool> {
        if self.fail_delete.lock().unwrap().contains(&id) {
            return Err(StoreError::Unavailable("disk I/O error".into()));
        }
        self.inner.delete_expired(id, cutoff)
    }

    fn username_exists(&self, username: &str) -> StoreResult<bool> {
        self.inner.username_exists(username)
    }

    fn email_exists(&self, email: &str) -> StoreResult<bool> {
        self.inner.email_exists(email)
    }

    fn find_active_by_email(&self, email: &str) -> StoreResult<Vec<Account>> {
        self.inner.find_active_by_email(email)
    }
}
