//! Error types for the registration workflow.

use crate::validation::FieldError;
use enlist_store::StoreError;
use thiserror::Error;

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors surfaced by [`crate::RegistrationService`].
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The identity store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The activation email could not be handed to the transport.
    /// The account it was meant for has already been created.
    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    /// The signup form failed validation.
    #[error("invalid signup: {}", describe(.0))]
    Invalid(Vec<FieldError>),

    /// No active account uses this email address.
    #[error("no active account uses this email address")]
    UnknownEmail,

    /// The account's password cannot be reset.
    #[error("the account for this email address cannot reset its password")]
    UnusablePassword,
}

/// Errors from a [`crate::Mailer`].
#[derive(Debug, Error)]
pub enum MailError {
    /// Writing the message failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
