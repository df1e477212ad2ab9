//! The registration service: issue, activate and purge.

use crate::clock::{Clock, SystemClock};
use crate::config::RegistrationConfig;
use crate::error::{RegistrationError, RegistrationResult};
use crate::mail::{Email, Mailer};
use crate::template::ActivationContext;
use crate::validation::{SignupForm, ValidationPipeline};
use enlist_store::AccountStore;
use enlist_types::{
    truncate_micros, Account, ActivationRecord, ActivationToken, ActivationWindow, NewAccount,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback invoked after an account is activated.
pub type ActivationListener = Box<dyn Fn(&Account) + Send + Sync>;

/// Outcome of presenting an activation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The account is now active.
    Activated(Account),
    /// Nothing changed.
    Rejected(Rejection),
}

impl Activation {
    /// Returns true if the key activated an account.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated(_))
    }

    /// Returns the activated account, if any.
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Activated(account) => Some(account),
            Self::Rejected(_) => None,
        }
    }
}

/// Why an activation key was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Not a 40-character lowercase hex string. The store was not consulted.
    Malformed,
    /// No record holds this key. Includes keys that were already used.
    NotFound,
    /// The key exists but its activation window has passed.
    Expired,
}

/// Summary of one purge sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    /// Records visited.
    pub scanned: usize,
    /// Accounts deleted.
    pub deleted: usize,
    /// Deletions that failed; the sweep continued past them.
    pub failed: usize,
}

/// Registration workflow bound to one store, mailer and clock.
pub struct RegistrationService {
    store: Arc<dyn AccountStore>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    config: RegistrationConfig,
    pipeline: ValidationPipeline,
    listeners: Vec<ActivationListener>,
}

impl RegistrationService {
    /// Creates a service using the system clock and the signup checks
    /// selected in `config`.
    pub fn new(
        config: RegistrationConfig,
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let pipeline = ValidationPipeline::from_config(&config.signup);
        Self {
            store,
            mailer,
            clock: Arc::new(SystemClock),
            config,
            pipeline,
            listeners: Vec::new(),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the signup validation pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ValidationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Registers a callback run after each successful activation.
    pub fn on_activated(&mut self, listener: impl Fn(&Account) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// The activation window.
    #[must_use]
    pub fn window(&self) -> ActivationWindow {
        self.config.window()
    }

    /// Validates a signup form and creates the account, sending the
    /// activation email.
    pub fn register(&self, form: &SignupForm) -> RegistrationResult<Account> {
        self.validate(form)?;
        self.create_inactive_account(&form.username, &form.password1, &form.email, true)
    }

    /// Runs the signup checks without creating anything.
    pub fn validate(&self, form: &SignupForm) -> RegistrationResult<()> {
        let errors = self.pipeline.validate(form, self.store.as_ref())?;
        if !errors.is_empty() {
            debug!(username = %form.username, failures = errors.len(), "signup rejected");
            return Err(RegistrationError::Invalid(errors));
        }
        Ok(())
    }

    /// Creates an inactive account with a fresh activation key.
    ///
    /// With `notify`, the key is emailed to the account's address. A mail
    /// failure is returned as [`RegistrationError::Mail`], but the account
    /// stays created; callers that retry must not re-register.
    pub fn create_inactive_account(
        &self,
        username: &str,
        password: &str,
        email: &str,
        notify: bool,
    ) -> RegistrationResult<Account> {
        let token = ActivationToken::generate(username);
        let new = NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            date_joined: truncate_micros(self.clock.now()),
        };
        let account = self.store.create_inactive(new, &token)?;
        info!(account = %account.id, username = %account.username, "inactive account created");

        if notify {
            self.send_activation_email(&account, &token)?;
        }
        Ok(account)
    }

    /// Renders and sends the activation email for `account`.
    fn send_activation_email(
        &self,
        account: &Account,
        token: &ActivationToken,
    ) -> RegistrationResult<()> {
        let ctx = ActivationContext {
            site: &self.config.site,
            activation_key: token.as_str(),
            expiration_days: self.config.activation_days,
        };
        let email = Email {
            from: self.config.from_email.clone(),
            to: account.email.clone(),
            subject: self.config.templates.render_subject(&ctx),
            body: self.config.templates.render_body(&ctx),
        };
        self.mailer.send(&email)?;
        debug!(account = %account.id, "activation email sent");
        Ok(())
    }

    /// Activates the account holding `key`.
    ///
    /// Malformed input is rejected before any store access. A well-formed
    /// key is consumed by a single conditional update, so concurrent calls
    /// with the same key activate at most once.
    pub fn activate(&self, key: &str) -> RegistrationResult<Activation> {
        let Some(token) = ActivationToken::parse(key) else {
            debug!("activation key malformed");
            return Ok(Activation::Rejected(Rejection::Malformed));
        };

        let cutoff = self.window().cutoff(self.clock.now());
        if let Some(account) = self.store.activate(&token, cutoff)? {
            info!(account = %account.id, username = %account.username, "account activated");
            for listener in &self.listeners {
                listener(&account);
            }
            return Ok(Activation::Activated(account));
        }

        let rejection = match self.store.find_record(&token)? {
            Some(_) => Rejection::Expired,
            None => Rejection::NotFound,
        };
        debug!(?rejection, "activation key rejected");
        Ok(Activation::Rejected(rejection))
    }

    /// Returns true if the record's key can no longer be used.
    #[must_use]
    pub fn is_expired(&self, record: &ActivationRecord) -> bool {
        self.window().is_expired(record, self.clock.now())
    }

    /// Deletes every inactive account whose activation key has expired.
    ///
    /// A failed deletion is logged and counted; the sweep carries on. Only
    /// a failure to list the records is returned as an error.
    pub fn purge_expired_accounts(&self) -> RegistrationResult<PurgeReport> {
        let now = self.clock.now();
        let window = self.window();
        let cutoff = window.cutoff(now);
        let records = self.store.records()?;

        let mut report = PurgeReport {
            scanned: records.len(),
            ..PurgeReport::default()
        };
        for record in records
            .iter()
            .filter(|r| !r.account.is_active && window.is_expired(r, now))
        {
            match self.store.delete_expired(record.account.id, cutoff) {
                Ok(true) => {
                    debug!(account = %record.account.id, "expired account purged");
                    report.deleted += 1;
                }
                Ok(false) => {
                    debug!(account = %record.account.id, "account changed before purge, kept");
                }
                Err(e) => {
                    warn!(account = %record.account.id, error = %e, "failed to purge account");
                    report.failed += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            deleted = report.deleted,
            failed = report.failed,
            "purge complete"
        );
        Ok(report)
    }

    /// Finds the account a password reset for `email` should target.
    ///
    /// Several active accounts may share an address; the earliest joined is
    /// returned. If any of them has an unusable password the whole lookup
    /// fails with [`RegistrationError::UnusablePassword`], even when another
    /// match could be reset.
    pub fn password_reset_account(&self, email: &str) -> RegistrationResult<Account> {
        let mut accounts = self.store.find_active_by_email(email)?;
        if accounts.is_empty() {
            return Err(RegistrationError::UnknownEmail);
        }
        if accounts.iter().any(Account::has_unusable_password) {
            return Err(RegistrationError::UnusablePassword);
        }
        Ok(accounts.remove(0))
    }
}
