//! Outbound email transports.
//!
//! The workflow only needs to hand a rendered message to something that
//! delivers it. Delivery itself (SMTP, an HTTP relay) is the host's job;
//! the transports here cover logging, a file spool and tests.

use crate::error::MailError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    /// Always a single line.
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Formats the message as RFC 5322 text.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            self.from,
            self.to,
            self.subject,
            self.body.replace('\n', "\r\n"),
        )
    }
}

/// Hands messages to a delivery mechanism.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Logs messages instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "email not delivered (log transport)");
        Ok(())
    }
}

/// Writes each message as an `.eml` file into a spool directory.
#[derive(Debug, Clone)]
pub struct SpoolMailer {
    dir: PathBuf,
}

impl SpoolMailer {
    /// Creates a spool in `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, MailError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the spool directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Mailer for SpoolMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        let path = self.dir.join(format!("{}.eml", uuid::Uuid::now_v7()));
        fs::write(&path, email.to_rfc5322())?;
        info!(to = %email.to, path = %path.display(), "email spooled");
        Ok(())
    }
}

/// Keeps sent messages in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Email>>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError::Rejected("mailbox lock poisoned".into()))?
            .push(email.clone());
        Ok(())
    }
}
