//! Command-line surface for Enlist.
//!
//! Wires a [`RegistrationService`] to the SQLite store and the configured
//! mail transport, and runs one command against it. Every command writes a
//! JSON document to the supplied writer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use enlist_registration::{
    Activation, LogMailer, Mailer, RegistrationConfig, RegistrationService, Rejection,
    SignupForm, SpoolMailer,
};
use enlist_store::SqliteStore;
use enlist_types::Account;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "enlist")]
#[command(about = "Account registration, activation and cleanup")]
pub struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "ENLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an inactive account and email its activation key
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Accept the terms of service
        #[arg(long)]
        tos: bool,
        /// Skip the activation email
        #[arg(long)]
        no_email: bool,
    },
    /// Activate the account holding this key
    Activate { key: String },
    /// Delete inactive accounts whose activation key has expired
    Purge,
    /// Validate and print the effective configuration
    CheckConfig,
}

/// Result of a command, used to pick the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
}

#[derive(Serialize)]
struct ActivationOutput<'a> {
    activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<&'a Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<Rejection>,
}

/// Loads the config file, or the defaults when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<RegistrationConfig> {
    match path {
        Some(path) => RegistrationConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(RegistrationConfig::default()),
    }
}

/// Builds the service for `config`: SQLite store plus spool or log mailer.
pub fn build_service(config: RegistrationConfig) -> Result<RegistrationService> {
    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("failed to open store at {}", config.database.display()))?;
    let mailer: Arc<dyn Mailer> = match &config.mail.spool_dir {
        Some(dir) => Arc::new(
            SpoolMailer::new(dir)
                .with_context(|| format!("failed to prepare mail spool {}", dir.display()))?,
        ),
        None => Arc::new(LogMailer),
    };
    Ok(RegistrationService::new(config, Arc::new(store), mailer))
}

/// Runs `command` and writes its JSON result to `out`.
pub fn execute(
    service: &RegistrationService,
    command: &Command,
    out: &mut impl Write,
) -> Result<Outcome> {
    match command {
        Command::Register {
            username,
            email,
            password,
            tos,
            no_email,
        } => {
            let form = SignupForm {
                username: username.clone(),
                email: email.clone(),
                password1: password.clone(),
                password2: password.clone(),
                tos_accepted: *tos,
            };
            let account = if *no_email {
                service.validate(&form)?;
                service.create_inactive_account(username, password, email, false)?
            } else {
                service.register(&form)?
            };
            write_json(out, &account)?;
            Ok(Outcome::Success)
        }
        Command::Activate { key } => {
            let activation = service.activate(key)?;
            let output = match &activation {
                Activation::Activated(account) => ActivationOutput {
                    activated: true,
                    account: Some(account),
                    reason: None,
                },
                Activation::Rejected(reason) => ActivationOutput {
                    activated: false,
                    account: None,
                    reason: Some(*reason),
                },
            };
            write_json(out, &output)?;
            Ok(if activation.is_activated() {
                Outcome::Success
            } else {
                Outcome::Rejected
            })
        }
        Command::Purge => {
            let report = service
                .purge_expired_accounts()
                .context("purge failed: store unavailable")?;
            info!(deleted = report.deleted, "purge finished");
            write_json(out, &report)?;
            Ok(Outcome::Success)
        }
        Command::CheckConfig => {
            write_json(out, service.config())?;
            Ok(Outcome::Success)
        }
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
