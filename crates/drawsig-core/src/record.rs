//! Signature records and their wire format.
//!
//! ```text
//! signerName|signerUsername|signedAt|documentDigest|base64(signature)
//! signerName|signerUsername|signedAt|documentDigest|base64(signature)|rsa-sha256|<keyRef>
//! ```
//!
//! The first form is used by HMAC records and is the bit-exact layout stored by
//! every existing deployment. Certificate records append a method trailer naming
//! the scheme and the SHA-256 fingerprint of the signer's public key, so the
//! verifier can dispatch without guessing.
//!
//! The canonical payload (what is signed) is the first four fields joined with
//! `|`. Parsing keeps the timestamp text exactly as stored, so the payload
//! rebuilt on the verify path is byte-identical to the one that was signed.
//!
//! No escaping is applied. Identity text containing `|` is refused when a record
//! is created.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::errors::{ParseError, SigningError};
use crate::model::Identity;

pub const DELIMITER: char = '|';

const METHOD_HMAC: &str = "hmac-sha256";
const METHOD_RSA: &str = "rsa-sha256";

/// Which scheme produced a record's signature bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignatureMethod {
    /// HMAC-SHA256 under a shared-secret key.
    #[default]
    Hmac,
    /// SHA-256 with RSA (PKCS#1 v1.5), public key identified by SPKI fingerprint.
    RsaSha256 { key_ref: String },
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hmac => METHOD_HMAC,
            Self::RsaSha256 { .. } => METHOD_RSA,
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac => f.write_str(METHOD_HMAC),
            Self::RsaSha256 { key_ref } => write!(f, "{METHOD_RSA}:{key_ref}"),
        }
    }
}

/// A method tag plus the bytes it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub method: SignatureMethod,
    pub bytes: Vec<u8>,
}

/// One signature over one drawing. Never mutated after it is signed;
/// re-signing builds a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    signer_name: String,
    signer_username: String,
    signed_at: OffsetDateTime,
    signed_at_text: String,
    document_digest: String,
    method: SignatureMethod,
    signature: Vec<u8>,
}

impl SignatureRecord {
    /// Start a record for `identity`. The timestamp is normalised to UTC.
    pub fn unsigned(
        identity: &Identity,
        signed_at: OffsetDateTime,
        document_digest: impl Into<String>,
    ) -> Result<Self, SigningError> {
        check_field("signer name", identity.full_name())?;
        check_field("signer username", identity.username())?;

        let signed_at = signed_at.to_offset(UtcOffset::UTC);
        let signed_at_text = signed_at
            .format(&Rfc3339)
            .map_err(|e| SigningError::Encoding(format!("timestamp formatting failed: {e}")))?;

        let document_digest = document_digest.into();
        check_field("document digest", &document_digest)?;

        Ok(Self {
            signer_name: identity.full_name().to_string(),
            signer_username: identity.username().to_string(),
            signed_at,
            signed_at_text,
            document_digest,
            method: SignatureMethod::Hmac,
            signature: Vec::new(),
        })
    }

    /// Attach a signature produced over `canonical_payload()`.
    pub fn attach(mut self, signature: Signature) -> Self {
        self.method = signature.method;
        self.signature = signature.bytes;
        self
    }

    pub fn signer_name(&self) -> &str {
        &self.signer_name
    }

    pub fn signer_username(&self) -> &str {
        &self.signer_username
    }

    pub fn signed_at(&self) -> OffsetDateTime {
        self.signed_at
    }

    /// The timestamp exactly as it appears in the payload.
    pub fn signed_at_text(&self) -> &str {
        &self.signed_at_text
    }

    pub fn document_digest(&self) -> &str {
        &self.document_digest
    }

    pub fn method(&self) -> &SignatureMethod {
        &self.method
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// `signerName|signerUsername|signedAt|documentDigest`
    pub fn canonical_payload(&self) -> String {
        canonical_payload(
            &self.signer_name,
            &self.signer_username,
            &self.signed_at_text,
            &self.document_digest,
        )
    }

    pub fn serialize(&self) -> String {
        let mut out = self.canonical_payload();
        out.push(DELIMITER);
        out.push_str(&general_purpose::STANDARD.encode(&self.signature));
        if let SignatureMethod::RsaSha256 { key_ref } = &self.method {
            out.push(DELIMITER);
            out.push_str(METHOD_RSA);
            out.push(DELIMITER);
            out.push_str(key_ref);
        }
        out
    }

    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = s.split(DELIMITER).collect();
        if fields.len() < 5 {
            return Err(ParseError::FieldCount {
                found: fields.len(),
            });
        }

        let method = match &fields[5..] {
            [] => SignatureMethod::Hmac,
            [m] if *m == METHOD_HMAC => SignatureMethod::Hmac,
            [m, key_ref] if *m == METHOD_RSA => SignatureMethod::RsaSha256 {
                key_ref: (*key_ref).to_string(),
            },
            [m] | [m, _] if *m != METHOD_HMAC && *m != METHOD_RSA => {
                return Err(ParseError::UnknownMethod((*m).to_string()))
            }
            _ => {
                return Err(ParseError::FieldCount {
                    found: fields.len(),
                })
            }
        };

        let signed_at = OffsetDateTime::parse(fields[2], &Rfc3339)
            .map_err(|e| ParseError::BadTimestamp(format!("{}: {e}", fields[2])))?;

        let signature = general_purpose::STANDARD
            .decode(fields[4])
            .map_err(|e| ParseError::BadBase64(e.to_string()))?;

        Ok(Self {
            signer_name: fields[0].to_string(),
            signer_username: fields[1].to_string(),
            signed_at,
            signed_at_text: fields[2].to_string(),
            document_digest: fields[3].to_string(),
            method,
            signature,
        })
    }
}

impl fmt::Display for SignatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl std::str::FromStr for SignatureRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Join the four signed fields.
pub fn canonical_payload(name: &str, username: &str, signed_at: &str, digest: &str) -> String {
    let mut out = String::with_capacity(name.len() + username.len() + signed_at.len() + digest.len() + 3);
    for (i, part) in [name, username, signed_at, digest].into_iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(part);
    }
    out
}

fn check_field(field: &'static str, value: &str) -> Result<(), SigningError> {
    if value.contains(DELIMITER) || value.contains('\n') || value.contains('\r') {
        return Err(SigningError::DelimiterInField { field });
    }
    Ok(())
}
