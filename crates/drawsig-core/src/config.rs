//! Configuration structures for drawsig-core.
//!
//! This module defines explicit configuration objects used by higher-level
//! components (CLI, host add-ins) to control content hashing, the fallback
//! shared-secret path and verification.
//!
//! The core crate itself does not read environment variables. All configuration
//! must be provided explicitly by the caller.

use crate::errors::{DrawsigError, DrawsigResult};

/// Suffix appended to the username to form the fallback HMAC key.
///
/// This is the value existing deployments used, so records they produced keep
/// verifying. It is not a secret.
pub const DEFAULT_SHARED_SECRET_SUFFIX: &str = "密钥后缀";

/// Smallest RSA modulus accepted for signing.
pub const DEFAULT_MIN_RSA_BITS: usize = 2048;

/// Global configuration container.
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    pub hashing: HashingConfig,
    pub signing: SigningConfig,
    pub verification: VerificationConfig,
}

/// Content digest configuration.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub algorithm: HashAlgorithm,
    pub newline: NewlineMode,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            newline: NewlineMode::Lf,
        }
    }
}

/// Signing configuration.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub shared_secret_suffix: String,
    pub min_rsa_bits: usize,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            shared_secret_suffix: DEFAULT_SHARED_SECRET_SUFFIX.to_string(),
            min_rsa_bits: DEFAULT_MIN_RSA_BITS,
        }
    }
}

/// Verification configuration.
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Accept HMAC records. Deployments that only issue certificate signatures
    /// can turn this off so forged fallback records are rejected.
    pub allow_hmac: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { allow_hmac: true }
    }
}

/// Line terminator appended after each canonical digest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlineMode {
    Lf,
    CrLf,
}

impl NewlineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "lf",
            Self::CrLf => "crlf",
        }
    }

    pub fn terminator(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    pub fn parse(s: &str) -> DrawsigResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(Self::Lf),
            "crlf" => Ok(Self::CrLf),
            _ => Err(DrawsigError::invalid_argument(format!(
                "unsupported newline mode: {s}"
            ))),
        }
    }
}

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> DrawsigResult<()> {
    if cfg.signing.shared_secret_suffix.is_empty() {
        return Err(DrawsigError::invalid_argument(
            "shared secret suffix must not be empty",
        ));
    }

    if cfg.signing.min_rsa_bits < 1024 {
        return Err(DrawsigError::invalid_argument(
            "min_rsa_bits must be at least 1024",
        ));
    }

    Ok(())
}
