//! Registration settings loaded from a TOML file.
//!
//! ```toml
//! activation_days = 7
//! from_email = "noreply@example.com"
//! site = "example.com"
//! database = "enlist.db"
//!
//! [mail]
//! spool_dir = "outbox"
//!
//! [signup]
//! unique_email = true
//! terms_of_service = true
//! ```

use crate::error::ConfigError;
use crate::template::ActivationTemplates;
use enlist_types::ActivationWindow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest accepted activation window, in days.
pub const MAX_ACTIVATION_DAYS: u32 = 36_500;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrationConfig {
    /// Days an activation key stays valid after signup.
    pub activation_days: u32,
    /// Sender address for activation emails.
    pub from_email: String,
    /// Site identifier shown in activation emails.
    pub site: String,
    /// SQLite database path.
    pub database: PathBuf,
    pub mail: MailConfig,
    pub templates: ActivationTemplates,
    pub signup: SignupConfig,
}

/// Outbound mail settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    /// Directory to spool `.eml` files into. Log-only when unset.
    pub spool_dir: Option<PathBuf>,
}

/// Optional signup checks. Format and username checks always run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignupConfig {
    /// Reject emails already used by another account.
    pub unique_email: bool,
    /// Require the terms-of-service box to be ticked.
    pub terms_of_service: bool,
    /// Reject addresses at free webmail domains.
    pub no_free_email: bool,
    /// Replaces the built-in free webmail domain list.
    pub blocked_domains: Option<Vec<String>>,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            activation_days: ActivationWindow::default().as_days(),
            from_email: "webmaster@localhost".to_string(),
            site: "example.com".to_string(),
            database: PathBuf::from("enlist.db"),
            mail: MailConfig::default(),
            templates: ActivationTemplates::default(),
            signup: SignupConfig::default(),
        }
    }
}

impl RegistrationConfig {
    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates config text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the workflow cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activation_days == 0 {
            return Err(ConfigError::Invalid(
                "activation_days must be at least 1".into(),
            ));
        }
        if self.activation_days > MAX_ACTIVATION_DAYS {
            return Err(ConfigError::Invalid(format!(
                "activation_days must be at most {MAX_ACTIVATION_DAYS}"
            )));
        }
        if self.from_email.trim().is_empty() {
            return Err(ConfigError::Invalid("from_email is required".into()));
        }
        if self.site.trim().is_empty() {
            return Err(ConfigError::Invalid("site is required".into()));
        }
        Ok(())
    }

    /// The activation window.
    #[must_use]
    pub fn window(&self) -> ActivationWindow {
        ActivationWindow::days(self.activation_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RegistrationConfig::from_toml_str("").unwrap();
        assert_eq!(config, RegistrationConfig::default());
        assert_eq!(config.window().as_days(), 7);
    }

    #[test]
    fn zero_day_window_rejected() {
        let err = RegistrationConfig::from_toml_str("activation_days = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn oversized_window_rejected() {
        let err = RegistrationConfig::from_toml_str("activation_days = 4000000000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let config = RegistrationConfig::from_toml_str("activation_days = 36500").unwrap();
        assert_eq!(config.window().as_days(), MAX_ACTIVATION_DAYS);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = RegistrationConfig::from_toml_str("activation_dayz = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
