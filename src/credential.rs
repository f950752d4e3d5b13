//! PIN credential digests
//!
//! PINs are stored as an unsalted SHA-256 digest. Two accounts sharing a PIN
//! share a digest, so a digest is only ever compared together with an
//! account number and never used on its own to locate an account.

use sha2::{Digest, Sha256};

/// Length of a rendered digest in hex characters
pub const DIGEST_LEN: usize = 64;

/// Compute the stored credential digest for a PIN
pub fn pin_digest(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    hex::encode(hasher.finalize())
}
