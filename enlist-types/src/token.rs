//! Activation tokens.
//!
//! A live token is the hex-encoded SHA-1 of a short random salt followed by
//! the username. Once the owning account is activated the token is replaced
//! by [`ACTIVATED_SENTINEL`] and can never match a lookup again.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// Token value stored after a successful activation.
pub const ACTIVATED_SENTINEL: &str = "ALREADY_ACTIVATED";

/// Length of a live token (hex-encoded 160-bit digest).
pub const TOKEN_LEN: usize = 40;

/// Number of hex characters of the salt digest mixed into a token.
const SALT_LEN: usize = 5;

/// An activation token: either a 40-hex digest or the consumed sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivationToken(String);

impl ActivationToken {
    /// Generates a fresh token for `username`.
    #[must_use]
    pub fn generate(username: &str) -> Self {
        let seed: u64 = rand::random();
        let salt = hex::encode(Sha1::digest(seed.to_string().as_bytes()));

        let mut hasher = Sha1::new();
        hasher.update(&salt.as_bytes()[..SALT_LEN]);
        hasher.update(username.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the consumed sentinel token.
    #[must_use]
    pub fn activated() -> Self {
        Self(ACTIVATED_SENTINEL.to_string())
    }

    /// Parses caller-supplied input as a live token.
    ///
    /// Returns `None` unless the input is exactly 40 lowercase hex
    /// characters. The sentinel is never accepted here.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        Self::is_digest(input).then(|| Self(input.to_string()))
    }

    /// Returns true if `input` matches `^[a-f0-9]{40}$`.
    #[must_use]
    pub fn is_digest(input: &str) -> bool {
        input.len() == TOKEN_LEN
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns true if this is the consumed sentinel.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.0 == ACTIVATED_SENTINEL
    }

    /// Returns the token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ActivationToken {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == ACTIVATED_SENTINEL || Self::is_digest(&value) {
            Ok(Self(value))
        } else {
            Err(crate::Error::InvalidToken(value))
        }
    }
}

impl From<ActivationToken> for String {
    fn from(token: ActivationToken) -> Self {
        token.0
    }
}
