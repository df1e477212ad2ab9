//! Accounts and activation records.

use crate::{AccountId, ActivationToken};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as held by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,
    /// Login name, unique case-insensitively.
    pub username: String,
    /// Contact address the activation email is sent to.
    pub email: String,
    /// Stored password credential. Opaque to the registration workflow.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Creation time; doubles as the token issue time.
    pub date_joined: DateTime<Utc>,
}

impl Account {
    /// Returns true if the stored credential can never match a password.
    #[must_use]
    pub fn has_unusable_password(&self) -> bool {
        self.password.is_empty()
    }
}

/// Input for creating an account. The store decides how `password` is kept.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_joined: DateTime<Utc>,
}

/// The activation record paired with its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub account: Account,
    pub token: ActivationToken,
}

impl ActivationRecord {
    /// Issue time of the token.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.account.date_joined
    }
}
