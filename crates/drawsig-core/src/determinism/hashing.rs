//! Hashing primitives for drawsig.
//!
//! All hashes are:
//! - deterministic
//! - explicitly parameterized
//! - rendered as lowercase hex when shown as text
//!
//! Comparison of authentication codes goes through `constant_time_eq`; never
//! compare MACs with `==`.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::HashAlgorithm;
use crate::errors::SigningError;

type HmacSha256 = Hmac<Sha256>;

/// Hash raw bytes using the selected algorithm.
pub fn hash_bytes(alg: HashAlgorithm, bytes: &[u8]) -> Vec<u8> {
    match alg {
        HashAlgorithm::Sha256 => {
            let mut h = Sha256::new();
            h.update(bytes);
            h.finalize().to_vec()
        }
    }
}

/// SHA-256 of raw bytes as lowercase hex (64 characters).
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(hash_bytes(HashAlgorithm::Sha256, bytes))
}

/// HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SigningError::KeyUnusable(format!("hmac key rejected: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compare two byte strings without short-circuiting on content.
///
/// Unequal lengths fail immediately; only the length leaks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
