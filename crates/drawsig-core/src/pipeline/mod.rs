//! Signing and verification flows.
//!
//! Data flow when signing:
//!
//! ```text
//! drawing -> ContentDigest -> SignatureRecord -> Signer -> serialized record -> property bag
//! ```
//!
//! Verification reverses it: property bag -> record string -> parse -> signature
//! check -> digest recomputed on the current drawing and compared.
//!
//! This module does no I/O of its own. Documents and storage come in through
//! `model::DrawingContent` and `store::PropertyBag`.

pub mod sign;
pub mod verify;

pub use sign::{sign_document, DocumentSigner, SignOutcome};
pub use verify::{VerificationOutcome, VerificationReason, Verifier};

use time::OffsetDateTime;

/// Source of the signing time.
///
/// Signing reads the clock exactly once. Tests inject a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Default for FixedClock {
    fn default() -> Self {
        Self(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
