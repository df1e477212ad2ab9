//! Account registration and activation for Enlist.
//!
//! This crate handles:
//! - Signup: validate a form, create an inactive account, email its key
//! - Activation: consume a key once, inside its activation window
//! - Purge: delete inactive accounts whose key has expired
//!
//! # Activation keys
//!
//! A key is the SHA-1 hex digest of a random salt and the username. After
//! activation the stored key becomes `ALREADY_ACTIVATED`, which never
//! matches a lookup, so a key works at most once. Keys expire
//! `activation_days` after signup, with the boundary instant itself
//! counting as expired.
//!
//! # Results
//!
//! [`RegistrationService::activate`] distinguishes malformed, unknown and
//! expired keys through [`Rejection`]. Callers that must not reveal which
//! case applied should only look at [`Activation::is_activated`].

mod clock;
mod config;
mod error;
mod mail;
mod service;
mod template;
mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MailConfig, RegistrationConfig, SignupConfig, MAX_ACTIVATION_DAYS};
pub use error::{ConfigError, MailError, RegistrationError, RegistrationResult};
pub use mail::{Email, LogMailer, Mailer, MemoryMailer, SpoolMailer};
pub use service::{Activation, ActivationListener, PurgeReport, Rejection, RegistrationService};
pub use template::{ActivationContext, ActivationTemplates};
pub use validation::{
    EmailFormat, Field, FieldError, NoFreeEmail, PasswordsMatch, SignupCheck, SignupForm,
    TermsOfService, UniqueEmail, UniqueUsername, UsernameFormat, ValidationPipeline,
    EMAIL_MAX_LEN, FREE_EMAIL_DOMAINS, USERNAME_MAX_LEN,
};
