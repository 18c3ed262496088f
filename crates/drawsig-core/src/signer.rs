//! Signature generation.
//!
//! The identity decides the path:
//! - `has_certificate`: SHA-256 with RSA (PKCS#1 v1.5) using the supplied private key.
//! - otherwise: HMAC-SHA256 keyed by the shared-secret provider.
//!
//! Signing is a pure function of its inputs. Persisting the record is the
//! caller's job (see `pipeline::sign`).

use std::sync::Arc;

use tracing::debug;

use crate::config::SigningConfig;
use crate::crypto::{KeyMaterial, SharedSecretProvider, SuffixSecret};
use crate::determinism::hashing::{constant_time_eq, hmac_sha256};
use crate::errors::SigningError;
use crate::model::Identity;
use crate::record::{Signature, SignatureMethod, SignatureRecord};

/// Produces signatures over canonical record payloads.
#[derive(Clone)]
pub struct Signer {
    secrets: Arc<dyn SharedSecretProvider>,
    min_rsa_bits: usize,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("min_rsa_bits", &self.min_rsa_bits)
            .finish_non_exhaustive()
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new(&SigningConfig::default())
    }
}

impl Signer {
    /// Signer whose fallback key is `username ++ config.shared_secret_suffix`.
    pub fn new(config: &SigningConfig) -> Self {
        Self {
            secrets: Arc::new(SuffixSecret::new(config.shared_secret_suffix.clone())),
            min_rsa_bits: config.min_rsa_bits,
        }
    }

    pub fn with_secret_provider(mut self, secrets: Arc<dyn SharedSecretProvider>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn secret_provider(&self) -> Arc<dyn SharedSecretProvider> {
        Arc::clone(&self.secrets)
    }

    /// Sign `record`'s canonical payload for `identity`.
    ///
    /// `key` is consumed; an RSA key is dropped (and zeroized) before this returns.
    pub fn sign(
        &self,
        record: &SignatureRecord,
        identity: &Identity,
        key: KeyMaterial,
    ) -> Result<Signature, SigningError> {
        if record.signer_username() != identity.username() {
            return Err(SigningError::IdentityMismatch {
                record: record.signer_username().to_string(),
                identity: identity.username().to_string(),
            });
        }

        let payload = record.canonical_payload();

        let signature = if identity.has_certificate() {
            let KeyMaterial::Rsa(key) = key else {
                return Err(SigningError::MissingKey);
            };
            if key.bits() < self.min_rsa_bits {
                return Err(SigningError::KeyUnusable(format!(
                    "RSA key has {} bits, at least {} required",
                    key.bits(),
                    self.min_rsa_bits
                )));
            }
            let key_ref = key.verifying_key().fingerprint()?;
            let bytes = key.sign(payload.as_bytes())?;
            debug!(username = identity.username(), key_ref = %key_ref, "signed with RSA key");
            Signature {
                method: SignatureMethod::RsaSha256 { key_ref },
                bytes,
            }
        } else {
            drop(key);
            let bytes = mac_payload(self.secrets.as_ref(), &payload, identity.username())?;
            debug!(username = identity.username(), "signed with shared-secret MAC");
            Signature {
                method: SignatureMethod::Hmac,
                bytes,
            }
        };

        if signature.bytes.is_empty() {
            return Err(SigningError::EmptySignature);
        }
        Ok(signature)
    }
}

/// HMAC-SHA256 of `payload` under the provider's key for `username`.
pub fn mac_payload(
    secrets: &dyn SharedSecretProvider,
    payload: &str,
    username: &str,
) -> Result<Vec<u8>, SigningError> {
    let key = secrets.hmac_key(username);
    hmac_sha256(&key, payload.as_bytes())
}

/// Recompute the MAC for `username` and compare in constant time.
pub fn verify_mac(
    secrets: &dyn SharedSecretProvider,
    payload: &str,
    mac: &[u8],
    username: &str,
) -> bool {
    match mac_payload(secrets, payload, username) {
        Ok(expected) => constant_time_eq(&expected, mac),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use base64::{engine::general_purpose, Engine as _};
    use time::macros::datetime;

    use super::*;
    use crate::crypto::rsa::tests::test_key;

    const DIGEST: &str = "0f29e5fca71a309d0f44e8379dac83379b0d5fc504acc95e757f41130caaa40d";

    fn record_for(identity: &Identity) -> SignatureRecord {
        SignatureRecord::unsigned(identity, datetime!(2024-03-01 08:30:00 UTC), DIGEST).unwrap()
    }

    #[test]
    fn hmac_golden() {
        let id = Identity::password("alice", "Alice Liddell");
        let sig = Signer::default()
            .sign(&record_for(&id), &id, KeyMaterial::None)
            .unwrap();
        assert_eq!(sig.method, SignatureMethod::Hmac);
        assert_eq!(
            general_purpose::STANDARD.encode(&sig.bytes),
            "wnHLiEZi7MCERxQUM8fLND84PQDcPfMJxSQFFly2OPA="
        );
    }

    #[test]
    fn hmac_roundtrip_and_bit_flip() {
        let signer = Signer::default();
        let secrets = signer.secret_provider();
        let id = Identity::password("alice", "Alice");
        let record = record_for(&id);
        let mut sig = signer.sign(&record, &id, KeyMaterial::None).unwrap().bytes;
        let payload = record.canonical_payload();

        assert!(verify_mac(secrets.as_ref(), &payload, &sig, "alice"));
        assert!(!verify_mac(secrets.as_ref(), &payload, &sig, "bob"));

        sig[0] ^= 0x01;
        assert!(!verify_mac(secrets.as_ref(), &payload, &sig, "alice"));
    }

    #[test]
    fn suffix_is_configurable() {
        let id = Identity::password("alice", "Alice");
        let record = record_for(&id);
        let a = Signer::default().sign(&record, &id, KeyMaterial::None).unwrap();
        let cfg = SigningConfig {
            shared_secret_suffix: "site-secret".to_string(),
            ..SigningConfig::default()
        };
        let b = Signer::new(&cfg).sign(&record, &id, KeyMaterial::None).unwrap();
        assert_ne!(a.bytes, b.bytes);
    }

    #[test]
    fn hmac_path_ignores_key() {
        let id = Identity::password("alice", "Alice");
        let sig = Signer::default()
            .sign(&record_for(&id), &id, KeyMaterial::Rsa(test_key()))
            .unwrap();
        assert_eq!(sig.method, SignatureMethod::Hmac);
    }

    #[test]
    fn certificate_path_uses_rsa() {
        let id = Identity::certificate("alice", "Alice");
        let record = record_for(&id);
        let key = test_key();
        let vk = key.verifying_key();
        let sig = Signer::default().sign(&record, &id, key.into()).unwrap();

        assert_matches!(&sig.method, SignatureMethod::RsaSha256 { key_ref } if *key_ref == vk.fingerprint().unwrap());
        assert!(vk.verify(record.canonical_payload().as_bytes(), &sig.bytes));
    }

    #[test]
    fn certificate_path_requires_key() {
        let id = Identity::certificate("alice", "Alice");
        assert_matches!(
            Signer::default().sign(&record_for(&id), &id, KeyMaterial::None),
            Err(SigningError::MissingKey)
        );
    }

    #[test]
    fn weak_key_refused() {
        let id = Identity::certificate("alice", "Alice");
        let cfg = SigningConfig {
            min_rsa_bits: 4096,
            ..SigningConfig::default()
        };
        assert_matches!(
            Signer::new(&cfg).sign(&record_for(&id), &id, test_key().into()),
            Err(SigningError::KeyUnusable(_))
        );
    }

    #[test]
    fn identity_must_match_record() {
        let alice = Identity::password("alice", "Alice");
        let bob = Identity::password("bob", "Bob");
        assert_matches!(
            Signer::default().sign(&record_for(&alice), &bob, KeyMaterial::None),
            Err(SigningError::IdentityMismatch { .. })
        );
    }
}
