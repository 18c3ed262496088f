//! Deterministic content hashing.

pub mod content_digest;
pub mod hashing;

pub use content_digest::{compute_digest, ContentDigest};
pub use hashing::{constant_time_eq, hmac_sha256, sha256_hex};
