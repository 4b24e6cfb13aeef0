//! SHA-256 helpers for the shared-secret webhook header.

use sha2::{Digest, Sha256};

/// Secret assumed when none is configured.
pub const DEFAULT_SHARED_SECRET: &str = "NO-KEY";

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// True when `presented` equals the hex digest of `secret` (or of
/// [`DEFAULT_SHARED_SECRET`] when unset). Comparison time does not depend on
/// where the strings first differ.
pub fn verify_api_key(presented: &str, secret: Option<&str>) -> bool {
    let expected = sha256_hex(secret.unwrap_or(DEFAULT_SHARED_SECRET).as_bytes());
    let presented = presented.trim().to_ascii_lowercase();
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
