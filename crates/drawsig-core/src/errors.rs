//! Error taxonomy for drawsig-core.
//!
//! Three families of failures exist:
//! - `SigningError`: the environment is misconfigured (unusable key, bad identity text).
//! - `ParseError`: a stored record string does not decode.
//! - `StoreError`: the storage collaborator failed to read or write.
//!
//! Verification failures are not errors. `pipeline::verify` always returns a
//! `VerificationOutcome` that callers branch on.
//!
//! `DrawsigError` wraps all of them for orchestration code that touches more than
//! one family (signing a document reads content, signs and persists).

use thiserror::Error;

/// Result alias used across the crate.
pub type DrawsigResult<T> = Result<T, DrawsigError>;

/// Failures while producing a signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("private key could not be read: {0}")]
    KeyUnreadable(String),

    #[error("unsupported private key type (algorithm {0}); an RSA key is required")]
    UnsupportedKeyType(String),

    #[error("private key is unusable: {0}")]
    KeyUnusable(String),

    #[error("identity requires a certificate key but none was supplied")]
    MissingKey,

    #[error("record signer {record} does not match identity {identity}")]
    IdentityMismatch { record: String, identity: String },

    #[error("{field} must not contain the record delimiter or line breaks")]
    DelimiterInField { field: &'static str },

    #[error("payload encoding failed: {0}")]
    Encoding(String),

    #[error("signing produced an empty signature")]
    EmptySignature,
}

/// Failures while decoding a serialized signature record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("record has {found} fields, expected 5 (or 7 with a method trailer)")]
    FieldCount { found: usize },

    #[error("record timestamp is not RFC 3339: {0}")]
    BadTimestamp(String),

    #[error("record signature is not valid base64: {0}")]
    BadBase64(String),

    #[error("unknown signature method: {0}")]
    UnknownMethod(String),
}

/// Failures reported by a storage collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum DrawsigError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DrawsigError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
