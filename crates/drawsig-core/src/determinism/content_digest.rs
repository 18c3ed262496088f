//! Content digest over the signature-relevant parts of a drawing.
//!
//! Canonical text, one line per entry, each ended by the configured terminator:
//!
//! ```text
//! <fieldName>:<fieldText>      for every title-block field, sheet by sheet
//! Title:<title>
//! Number:<part number>
//! Revision:<revision number>
//! Description:<description>
//! ```
//!
//! The text is UTF-8 encoded and hashed with SHA-256. Sheet and field order come
//! from the document and are never re-sorted. A property the host cannot supply
//! reads as the empty string.
//!
//! Limitation: a field text containing the line terminator can imitate the
//! following line. The layout is kept as-is so existing records keep verifying.

use tracing::debug;

use crate::config::HashingConfig;
use crate::determinism::hashing::hash_bytes;
use crate::model::{DocumentProperty, DrawingContent};

/// Computes content digests with a fixed hashing configuration.
#[derive(Debug, Clone, Default)]
pub struct ContentDigest {
    config: HashingConfig,
}

impl ContentDigest {
    pub fn new(config: HashingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HashingConfig {
        &self.config
    }

    /// The exact text that `compute` hashes.
    pub fn canonical_text<D: DrawingContent + ?Sized>(&self, doc: &D) -> String {
        let eol = self.config.newline.terminator();
        let mut out = String::new();

        for sheet in doc.sheets() {
            for field in &sheet.fields {
                out.push_str(&field.name);
                out.push(':');
                out.push_str(&field.text);
                out.push_str(eol);
            }
        }

        for property in DocumentProperty::ALL {
            let value = doc.property(property).unwrap_or_else(|| {
                debug!(
                    property = property.host_name(),
                    "document property missing, digesting as empty"
                );
                String::new()
            });
            out.push_str(property.digest_label());
            out.push(':');
            out.push_str(&value);
            out.push_str(eol);
        }

        out
    }

    /// Lowercase hex digest of the canonical text.
    pub fn compute<D: DrawingContent + ?Sized>(&self, doc: &D) -> String {
        let text = self.canonical_text(doc);
        let digest = hex::encode(hash_bytes(self.config.algorithm, text.as_bytes()));
        debug!(
            algorithm = self.config.algorithm.as_str(),
            newline = self.config.newline.as_str(),
            bytes = text.len(),
            digest = %digest,
            "computed content digest"
        );
        digest
    }
}

/// Digest with the default configuration (SHA-256, LF).
pub fn compute_digest<D: DrawingContent + ?Sized>(doc: &D) -> String {
    ContentDigest::default().compute(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NewlineMode;
    use crate::model::{Drawing, Sheet};

    const GOLDEN: &str = "0f29e5fca71a309d0f44e8379dac83379b0d5fc504acc95e757f41130caaa40d";

    fn bracket() -> Drawing {
        Drawing::new()
            .with_sheet(Sheet::new("Sheet:1").with_field("PartName", "Bracket"))
            .with_property(DocumentProperty::Title, "Bracket Drawing")
            .with_property(DocumentProperty::PartNumber, "PN-001")
            .with_property(DocumentProperty::RevisionNumber, "A")
            .with_property(DocumentProperty::Description, "v1")
    }

    #[test]
    fn canonical_text_layout() {
        let text = ContentDigest::default().canonical_text(&bracket());
        assert_eq!(
            text,
            "PartName:Bracket\nTitle:Bracket Drawing\nNumber:PN-001\nRevision:A\nDescription:v1\n"
        );
    }

    #[test]
    fn golden_digest() {
        let d = compute_digest(&bracket());
        assert_eq!(d, GOLDEN);
        assert_eq!(d.len(), 64);
    }

    #[test]
    fn crlf_changes_digest() {
        let cfg = HashingConfig {
            newline: NewlineMode::CrLf,
            ..HashingConfig::default()
        };
        let d = ContentDigest::new(cfg).compute(&bracket());
        assert_eq!(
            d,
            "69ad8f256dc815c127986d4764b5566eaea6eb69f839dca1cc069c069609e247"
        );
    }

    #[test]
    fn missing_properties_are_empty() {
        let d = compute_digest(&Drawing::new());
        assert_eq!(
            d,
            "8358ddddc5b91fd701e8999a3e7e62c4bde16ac66cce908d783116ed6a4d535c"
        );
        // Explicit empty strings and absent properties digest the same.
        let explicit = Drawing::new()
            .with_property(DocumentProperty::Title, "")
            .with_property(DocumentProperty::PartNumber, "")
            .with_property(DocumentProperty::RevisionNumber, "")
            .with_property(DocumentProperty::Description, "");
        assert_eq!(compute_digest(&explicit), d);
    }

    #[test]
    fn revision_change_detected() {
        let mut doc = bracket();
        doc.set_property(DocumentProperty::RevisionNumber, "B");
        assert_eq!(
            compute_digest(&doc),
            "4c132e353b1cab5c65d45628f20f61c96b099032f0dec89937a4ba64d2190c57"
        );
    }

    #[test]
    fn adjacent_fields_do_not_merge() {
        let a = Drawing::new().with_sheet(
            Sheet::new("1")
                .with_field("A", "BC")
                .with_field("D", ""),
        );
        let b = Drawing::new().with_sheet(
            Sheet::new("1")
                .with_field("A", "B")
                .with_field("CD", ""),
        );
        assert_ne!(compute_digest(&a), compute_digest(&b));
    }

    #[test]
    fn sheet_order_matters() {
        let s1 = Sheet::new("1").with_field("X", "1");
        let s2 = Sheet::new("2").with_field("X", "2");
        let a = Drawing::new().with_sheet(s1.clone()).with_sheet(s2.clone());
        let b = Drawing::new().with_sheet(s2).with_sheet(s1);
        assert_ne!(compute_digest(&a), compute_digest(&b));
    }

    #[test]
    fn unrelated_properties_ignored() {
        let mut doc = bracket();
        doc.properties
            .insert("Last Saved".to_string(), "2024-01-01".to_string());
        assert_eq!(compute_digest(&doc), GOLDEN);
    }
}
