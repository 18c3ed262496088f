//! Key material for the two signing paths.
//!
//! - Certificate path: an RSA private key (`rsa::RsaSigningKey`), verified against
//!   pinned public keys (`rsa::TrustedKeys`).
//! - Fallback path: an HMAC key obtained from a `SharedSecretProvider`.
//!
//! The fallback path is shared-secret authentication only. Anyone who knows how
//! the key is derived can produce a valid record for any username, so it gives no
//! non-repudiation. It exists so drawings can still be signed by users without a
//! certificate.

pub mod rsa;

pub use self::rsa::{RsaSigningKey, RsaVerifyingKey, TrustedKeys};

use zeroize::Zeroizing;

/// Private key handed to the signer for a single call.
#[derive(Debug, Default)]
pub enum KeyMaterial {
    /// No private key; only the fallback path is possible.
    #[default]
    None,
    Rsa(RsaSigningKey),
}

impl KeyMaterial {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<RsaSigningKey> for KeyMaterial {
    fn from(value: RsaSigningKey) -> Self {
        Self::Rsa(value)
    }
}

/// Supplies the HMAC key for a username on the fallback path.
pub trait SharedSecretProvider: Send + Sync {
    fn hmac_key(&self, username: &str) -> Zeroizing<Vec<u8>>;
}

/// `username ++ suffix`, UTF-8 encoded.
#[derive(Clone)]
pub struct SuffixSecret {
    suffix: String,
}

impl SuffixSecret {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for SuffixSecret {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SHARED_SECRET_SUFFIX)
    }
}

impl std::fmt::Debug for SuffixSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuffixSecret").finish_non_exhaustive()
    }
}

impl SharedSecretProvider for SuffixSecret {
    fn hmac_key(&self, username: &str) -> Zeroizing<Vec<u8>> {
        let mut key = Vec::with_capacity(username.len() + self.suffix.len());
        key.extend_from_slice(username.as_bytes());
        key.extend_from_slice(self.suffix.as_bytes());
        Zeroizing::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_key_derivation() {
        let s = SuffixSecret::new("-salt");
        assert_eq!(s.hmac_key("alice").as_slice(), b"alice-salt");
        assert_eq!(s.hmac_key("").as_slice(), b"-salt");
    }

    #[test]
    fn default_suffix_is_utf8() {
        let s = SuffixSecret::default();
        let key = s.hmac_key("bob");
        assert!(key.starts_with(b"bob"));
        assert_eq!(key.len(), 3 + "密钥后缀".len());
    }

    #[test]
    fn debug_hides_suffix() {
        let s = format!("{:?}", SuffixSecret::new("hidden"));
        assert!(!s.contains("hidden"));
    }
}
