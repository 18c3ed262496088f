//! Verification of a stored signature record against the current drawing.
//!
//! Verification never fails with an error. Every path ends in a
//! `VerificationOutcome`, and the identity/time from the record are returned
//! whenever the record parsed, so an operator can see who signed even when the
//! check fails.
//!
//! Steps, in order (first failure wins):
//! 1. status flag and record presence -> `NoSignature`
//! 2. record parse -> `MalformedRecord` / `InternalError`
//! 3. signature check, dispatched on the record's method -> `InvalidSignature`
//! 4. digest recomputed on the current drawing -> `ContentTampered`

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::crypto::{SharedSecretProvider, SuffixSecret, TrustedKeys};
use crate::determinism::{constant_time_eq, ContentDigest};
use crate::errors::ParseError;
use crate::model::{DrawingContent, SignatureStatus};
use crate::record::{SignatureMethod, SignatureRecord};
use crate::signer::verify_mac;
use crate::store::{PropertyBag, SignatureStore};

/// Why verification ended where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationReason {
    Valid,
    NoSignature,
    MalformedRecord,
    InvalidSignature,
    ContentTampered,
    InternalError,
}

impl VerificationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::NoSignature => "NoSignature",
            Self::MalformedRecord => "MalformedRecord",
            Self::InvalidSignature => "InvalidSignature",
            Self::ContentTampered => "ContentTampered",
            Self::InternalError => "InternalError",
        }
    }

    /// Operator-facing sentence.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "signature is valid",
            Self::NoSignature => "document has no electronic signature",
            Self::MalformedRecord => "signature data is not in the expected format",
            Self::InvalidSignature => "signature is invalid or has been tampered with",
            Self::ContentTampered => "document content changed after signing",
            Self::InternalError => "verification failed with an internal error",
        }
    }
}

impl fmt::Display for VerificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub reason: VerificationReason,
    pub signer_name: Option<String>,
    pub signer_username: Option<String>,
    pub signed_at: Option<OffsetDateTime>,
    pub method: Option<SignatureMethod>,
    /// Extra diagnostic text (parse error, missing key reference).
    pub detail: Option<String>,
}

impl VerificationOutcome {
    fn bare(reason: VerificationReason, detail: Option<String>) -> Self {
        Self {
            verified: false,
            reason,
            signer_name: None,
            signer_username: None,
            signed_at: None,
            method: None,
            detail,
        }
    }

    fn for_record(record: &SignatureRecord, reason: VerificationReason) -> Self {
        Self {
            verified: reason == VerificationReason::Valid,
            reason,
            signer_name: Some(record.signer_name().to_string()),
            signer_username: Some(record.signer_username().to_string()),
            signed_at: Some(record.signed_at()),
            method: Some(record.method().clone()),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Checks stored records against drawings.
#[derive(Clone)]
pub struct Verifier {
    secrets: Arc<dyn SharedSecretProvider>,
    trusted: TrustedKeys,
    digest: ContentDigest,
    allow_hmac: bool,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("trusted_keys", &self.trusted.len())
            .field("digest", &self.digest)
            .field("allow_hmac", &self.allow_hmac)
            .finish_non_exhaustive()
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl Verifier {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            secrets: Arc::new(SuffixSecret::new(
                config.signing.shared_secret_suffix.clone(),
            )),
            trusted: TrustedKeys::new(),
            digest: ContentDigest::new(config.hashing.clone()),
            allow_hmac: config.verification.allow_hmac,
        }
    }

    pub fn with_secret_provider(mut self, secrets: Arc<dyn SharedSecretProvider>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn with_trusted_keys(mut self, trusted: TrustedKeys) -> Self {
        self.trusted = trusted;
        self
    }

    pub fn trusted_keys(&self) -> &TrustedKeys {
        &self.trusted
    }

    pub fn verify<D: DrawingContent + ?Sized>(
        &self,
        doc: &D,
        status: SignatureStatus,
        stored: Option<&str>,
    ) -> VerificationOutcome {
        let outcome = self.evaluate(doc, status, stored);
        if outcome.verified {
            info!(
                signer = outcome.signer_username.as_deref().unwrap_or_default(),
                "signature valid"
            );
        } else {
            warn!(
                reason = outcome.reason.as_str(),
                signer = outcome.signer_username.as_deref().unwrap_or_default(),
                detail = outcome.detail.as_deref().unwrap_or_default(),
                "signature not verified"
            );
        }
        outcome
    }

    fn evaluate<D: DrawingContent + ?Sized>(
        &self,
        doc: &D,
        status: SignatureStatus,
        stored: Option<&str>,
    ) -> VerificationOutcome {
        if status != SignatureStatus::Signed {
            return VerificationOutcome::bare(VerificationReason::NoSignature, None);
        }
        let Some(raw) = stored.filter(|s| !s.is_empty()) else {
            return VerificationOutcome::bare(
                VerificationReason::NoSignature,
                Some("status is Signed but no record is stored".to_string()),
            );
        };

        let record = match SignatureRecord::parse(raw) {
            Ok(record) => record,
            Err(err) => {
                let reason = match err {
                    ParseError::FieldCount { .. } | ParseError::UnknownMethod(_) => {
                        VerificationReason::MalformedRecord
                    }
                    ParseError::BadTimestamp(_) | ParseError::BadBase64(_) => {
                        VerificationReason::InternalError
                    }
                };
                debug!(error = %err, "stored signature record did not parse");
                return VerificationOutcome::bare(reason, Some(err.to_string()));
            }
        };

        if let Err(detail) = self.check_signature(&record) {
            debug!(signer = record.signer_username(), %detail, "signature check failed");
            return VerificationOutcome::for_record(&record, VerificationReason::InvalidSignature)
                .with_detail(detail);
        }

        let current = self.digest.compute(doc);
        if !constant_time_eq(current.as_bytes(), record.document_digest().as_bytes()) {
            debug!(
                stored = record.document_digest(),
                current = %current,
                "content digest mismatch"
            );
            return VerificationOutcome::for_record(&record, VerificationReason::ContentTampered);
        }

        VerificationOutcome::for_record(&record, VerificationReason::Valid)
    }

    /// Read the status flag from `store`, then the record only when the flag says signed.
    pub fn verify_stored<D, B>(&self, doc: &D, store: &SignatureStore<B>) -> VerificationOutcome
    where
        D: DrawingContent + ?Sized,
        B: PropertyBag,
    {
        let read = store.status().and_then(|status| match status {
            SignatureStatus::Signed => store.record_string().map(|record| (status, record)),
            SignatureStatus::Unsigned => Ok((status, None)),
        });
        match read {
            Ok((status, record)) => self.verify(doc, status, record.as_deref()),
            Err(err) => {
                warn!(error = %err, "signature properties could not be read");
                VerificationOutcome::bare(VerificationReason::InternalError, Some(err.to_string()))
            }
        }
    }

    fn check_signature(&self, record: &SignatureRecord) -> Result<(), String> {
        let payload = record.canonical_payload();
        match record.method() {
            SignatureMethod::Hmac => {
                if !self.allow_hmac {
                    return Err("shared-secret records are not accepted".to_string());
                }
                if verify_mac(
                    self.secrets.as_ref(),
                    &payload,
                    record.signature(),
                    record.signer_username(),
                ) {
                    Ok(())
                } else {
                    Err("MAC mismatch".to_string())
                }
            }
            SignatureMethod::RsaSha256 { key_ref } => {
                let Some(key) = self.trusted.get(key_ref) else {
                    return Err(format!("no trusted key with fingerprint {key_ref}"));
                };
                if key.verify(payload.as_bytes(), record.signature()) {
                    Ok(())
                } else {
                    Err("RSA signature mismatch".to_string())
                }
            }
        }
    }
}
