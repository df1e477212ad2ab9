//! At-rest representation of password credentials.
//!
//! Stored as `sha256$<salt hex>$<digest hex>`. An empty stored value is an
//! unusable credential that never verifies.

use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_BYTES: usize = 16;

/// Derives the stored credential for `password`.
///
/// An empty password yields the unusable credential.
#[must_use]
pub fn make_credential(password: &str) -> String {
    if password.is_empty() {
        return String::new();
    }
    let salt: [u8; SALT_BYTES] = rand::random();
    let salt_hex = hex::encode(salt);
    format!("{SCHEME}${salt_hex}${}", digest(&salt_hex, password))
}

/// Returns true if `password` matches the stored credential.
#[must_use]
pub fn verify_credential(stored: &str, password: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt_hex), Some(expected)) => digest(salt_hex, password) == expected,
        _ => false,
    }
}

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
