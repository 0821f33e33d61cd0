//! Content-addressed cache keys.
//!
//! A fingerprint is `sentiment:` followed by the lowercase hex SHA-256 of
//! the text's UTF-8 bytes. It depends on nothing but the bytes, so keys are
//! stable across restarts and across processes sharing one backend.

use sha2::{Digest, Sha256};

/// Namespace prefix separating result keys from unrelated keys in a
/// shared backend.
pub const KEY_PREFIX: &str = "sentiment";

/// Derive the cache key for a text.
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("{KEY_PREFIX}:{hex}")
}
