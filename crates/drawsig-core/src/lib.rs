//! drawsig-core
//!
//! Core primitives for signing engineering drawings:
//! - Deterministic content digest over title-block fields and document properties
//! - Signature records and their `|`-delimited wire format
//! - Signing (RSA with a certificate key, HMAC fallback otherwise)
//! - Verification with signature check and content re-hash
//! - A narrow property-bag contract for persisting records on the host document

pub mod config;
pub mod crypto;
pub mod determinism;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod signer;
pub mod store;

pub use crate::errors::{DrawsigError, DrawsigResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{validate_config, CoreConfig, NewlineMode};
    pub use crate::crypto::{KeyMaterial, RsaSigningKey, RsaVerifyingKey, SharedSecretProvider, TrustedKeys};
    pub use crate::determinism::{compute_digest, ContentDigest};
    pub use crate::model::{DocumentProperty, Drawing, DrawingContent, Identity, Sheet, SignatureStatus};
    pub use crate::pipeline::{
        Clock, DocumentSigner, FixedClock, SignOutcome, SystemClock, VerificationOutcome,
        VerificationReason, Verifier,
    };
    pub use crate::record::{SignatureMethod, SignatureRecord};
    pub use crate::signer::Signer;
    pub use crate::store::{MemoryPropertyBag, PropertyBag, SignatureStore, Upsert};
    pub use crate::{DrawsigError, DrawsigResult};
}
