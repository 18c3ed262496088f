//! Signer identity.

use crate::crypto::KeyMaterial;
use crate::errors::SigningError;

/// Who is signing. Produced by the host's authentication step and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    full_name: String,
    has_certificate: bool,
}

impl Identity {
    pub fn new(username: impl Into<String>, full_name: impl Into<String>, has_certificate: bool) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            has_certificate,
        }
    }

    /// Identity authenticated by password only; signs on the HMAC path.
    pub fn password(username: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(username, full_name, false)
    }

    /// Identity backed by a certificate key; signs with RSA.
    pub fn certificate(username: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(username, full_name, true)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn has_certificate(&self) -> bool {
        self.has_certificate
    }
}

/// Source of a signer identity and, for certificate identities, the private key.
pub trait IdentityProvider {
    fn authenticate(&mut self) -> Result<(Identity, KeyMaterial), SigningError>;
}
