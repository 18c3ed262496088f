//! drawsig data models.
//!
//! These are the shapes the core exchanges with its collaborators:
//! - drawing content (sheets, title-block fields, document properties)
//! - signer identity captured by the authentication step
//! - the signed/unsigned status flag stored next to a record
//!
//! Models are mostly "dumb" data. The host adapter decides how they map onto the
//! CAD application's object model.

pub mod drawing;
pub mod identity;

pub use drawing::{DocumentProperty, Drawing, DrawingContent, Sheet, TitleBlockField};
pub use identity::{Identity, IdentityProvider};

use std::fmt;

/// Signed/unsigned flag persisted alongside the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureStatus {
    #[default]
    Unsigned,
    Signed,
}

impl SignatureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsigned => "Unsigned",
            Self::Signed => "Signed",
        }
    }

    /// Read a stored status string. Only `signed` (any case) means signed.
    pub fn from_stored(value: &str) -> Self {
        if value.eq_ignore_ascii_case("signed") {
            Self::Signed
        } else {
            Self::Unsigned
        }
    }
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
