//! Signup form validation.
//!
//! A [`ValidationPipeline`] runs independent [`SignupCheck`]s over a
//! [`SignupForm`] and collects every failure. Which optional checks run is
//! decided by [`SignupConfig`].

use crate::config::SignupConfig;
use enlist_store::{AccountStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted username, in characters.
pub const USERNAME_MAX_LEN: usize = 30;

/// Longest accepted email address, in characters.
pub const EMAIL_MAX_LEN: usize = 75;

/// Free webmail domains refused by [`NoFreeEmail`] unless overridden.
pub const FREE_EMAIL_DOMAINS: &[&str] = &[
    "aim.com",
    "aol.com",
    "email.com",
    "gmail.com",
    "googlemail.com",
    "hotmail.com",
    "hushmail.com",
    "msn.com",
    "mail.ru",
    "mailinator.com",
    "live.com",
];

/// Raw signup input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub tos_accepted: bool,
}

/// Which form field a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Username,
    Email,
    Password,
    Tos,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::Tos => "tos",
        })
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One independent rule applied to a signup form.
pub trait SignupCheck: Send + Sync {
    /// Returns the failure, if any. Store errors abort validation.
    fn check(&self, form: &SignupForm, store: &dyn AccountStore) -> StoreResult<Option<FieldError>>;
}

/// Username is word characters only and at most 30 characters.
pub struct UsernameFormat;

impl SignupCheck for UsernameFormat {
    fn check(&self, form: &SignupForm, _: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        let name = &form.username;
        let valid = !name.is_empty()
            && name.chars().count() <= USERNAME_MAX_LEN
            && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        Ok((!valid).then(|| {
            FieldError::new(
                Field::Username,
                "Usernames may contain only letters, numbers and underscores (at most 30).",
            )
        }))
    }
}

/// Email has a local part and a dotted domain and fits in 75 characters.
pub struct EmailFormat;

impl SignupCheck for EmailFormat {
    fn check(&self, form: &SignupForm, _: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        let valid = match form.email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !form.email.chars().any(char::is_whitespace)
                    && form.email.chars().count() <= EMAIL_MAX_LEN
            }
            None => false,
        };
        Ok((!valid).then(|| FieldError::new(Field::Email, "Enter a valid email address.")))
    }
}

/// Both password entries are present and equal.
pub struct PasswordsMatch;

impl SignupCheck for PasswordsMatch {
    fn check(&self, form: &SignupForm, _: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        if form.password1.is_empty() {
            return Ok(Some(FieldError::new(Field::Password, "A password is required.")));
        }
        Ok((form.password1 != form.password2).then(|| {
            FieldError::new(Field::Password, "You must type the same password each time.")
        }))
    }
}

/// Username is not taken, ignoring case.
pub struct UniqueUsername;

impl SignupCheck for UniqueUsername {
    fn check(&self, form: &SignupForm, store: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        if form.username.is_empty() || !store.username_exists(&form.username)? {
            return Ok(None);
        }
        Ok(Some(FieldError::new(
            Field::Username,
            "This username is already taken. Please choose another.",
        )))
    }
}

/// Email is not used by another account, ignoring case.
pub struct UniqueEmail;

impl SignupCheck for UniqueEmail {
    fn check(&self, form: &SignupForm, store: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        if form.email.is_empty() || !store.email_exists(&form.email)? {
            return Ok(None);
        }
        Ok(Some(FieldError::new(
            Field::Email,
            "This email address is already in use. Please supply a different email address.",
        )))
    }
}

/// Email domain is not a blocked webmail provider.
pub struct NoFreeEmail {
    domains: Vec<String>,
}

impl NoFreeEmail {
    /// Blocks the given domains (compared case-insensitively).
    #[must_use]
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for NoFreeEmail {
    fn default() -> Self {
        Self::new(FREE_EMAIL_DOMAINS)
    }
}

impl SignupCheck for NoFreeEmail {
    fn check(&self, form: &SignupForm, _: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        let Some((_, domain)) = form.email.rsplit_once('@') else {
            return Ok(None);
        };
        let domain = domain.to_lowercase();
        Ok(self.domains.contains(&domain).then(|| {
            FieldError::new(
                Field::Email,
                "Registration using free email addresses is prohibited. Please supply a different email address.",
            )
        }))
    }
}

/// The terms-of-service box was ticked.
pub struct TermsOfService;

impl SignupCheck for TermsOfService {
    fn check(&self, form: &SignupForm, _: &dyn AccountStore) -> StoreResult<Option<FieldError>> {
        Ok((!form.tos_accepted)
            .then(|| FieldError::new(Field::Tos, "You must agree to the terms to register.")))
    }
}

/// An ordered list of checks.
pub struct ValidationPipeline {
    checks: Vec<Box<dyn SignupCheck>>,
}

impl ValidationPipeline {
    /// A pipeline with no checks.
    #[must_use]
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// The always-on checks: username and email format, password match,
    /// username uniqueness.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with(UsernameFormat)
            .with(EmailFormat)
            .with(PasswordsMatch)
            .with(UniqueUsername)
    }

    /// The standard checks plus the optional ones enabled in `config`.
    #[must_use]
    pub fn from_config(config: &SignupConfig) -> Self {
        let mut pipeline = Self::standard();
        if config.unique_email {
            pipeline = pipeline.with(UniqueEmail);
        }
        if config.no_free_email {
            pipeline = pipeline.with(match &config.blocked_domains {
                Some(domains) => NoFreeEmail::new(domains),
                None => NoFreeEmail::default(),
            });
        }
        if config.terms_of_service {
            pipeline = pipeline.with(TermsOfService);
        }
        pipeline
    }

    /// Appends a check.
    #[must_use]
    pub fn with(mut self, check: impl SignupCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Number of checks in the pipeline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every check and returns all failures in pipeline order.
    pub fn validate(
        &self,
        form: &SignupForm,
        store: &dyn AccountStore,
    ) -> StoreResult<Vec<FieldError>> {
        let mut errors = Vec::new();
        for check in &self.checks {
            if let Some(error) = check.check(form, store)? {
                errors.push(error);
            }
        }
        Ok(errors)
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}
