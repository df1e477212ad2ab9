//! Activation window expiration policy.

use crate::ActivationRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of days a token stays valid after issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationWindow(u32);

impl ActivationWindow {
    /// Creates a window of `days` days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self(days)
    }

    /// Returns the window length in days.
    #[must_use]
    pub const fn as_days(&self) -> u32 {
        self.0
    }

    /// Returns the window as a duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.0))
    }

    /// Latest issue time that counts as expired at `now`.
    ///
    /// A token issued at or before the cutoff is expired; one issued
    /// strictly after it is still live. Saturates at the earliest
    /// representable instant for windows reaching past it.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.duration())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns true if a token issued at `issued_at` has expired at `now`.
    ///
    /// The boundary is inclusive: a token expires exactly when
    /// `issued_at + window == now`. A window ending past the last
    /// representable instant never elapses.
    #[must_use]
    pub fn has_elapsed(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        issued_at
            .checked_add_signed(self.duration())
            .is_some_and(|expires| expires <= now)
    }

    /// Returns true if the record can no longer be activated.
    ///
    /// The consumed sentinel is always expired.
    #[must_use]
    pub fn is_expired(&self, record: &ActivationRecord, now: DateTime<Utc>) -> bool {
        record.token.is_activated() || self.has_elapsed(record.issued_at(), now)
    }
}

impl Default for ActivationWindow {
    fn default() -> Self {
        Self(7)
    }
}
