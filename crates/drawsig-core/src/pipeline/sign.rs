//! Sign a drawing and persist the record.

use std::sync::Arc;

use tracing::{info, info_span};

use crate::config::CoreConfig;
use crate::crypto::KeyMaterial;
use crate::determinism::ContentDigest;
use crate::errors::DrawsigResult;
use crate::model::{DrawingContent, Identity, SignatureStatus};
use crate::pipeline::{Clock, SystemClock};
use crate::record::SignatureRecord;
use crate::signer::Signer;
use crate::store::{PropertyBag, SignatureStore};

/// Result of signing one drawing.
#[derive(Debug, Clone)]
pub struct SignOutcome {
    pub record: SignatureRecord,
    pub serialized: String,
    /// A previous record was overwritten.
    pub replaced: bool,
}

/// Digest, sign and persist in one step.
#[derive(Clone)]
pub struct DocumentSigner {
    signer: Signer,
    digest: ContentDigest,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DocumentSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSigner")
            .field("signer", &self.signer)
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

impl Default for DocumentSigner {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl DocumentSigner {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            signer: Signer::new(&config.signing),
            digest: ContentDigest::new(config.hashing.clone()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Sign `doc` as `identity` and write the record into `store`.
    pub fn sign<D, B>(
        &self,
        doc: &D,
        store: &SignatureStore<B>,
        identity: &Identity,
        key: KeyMaterial,
    ) -> DrawsigResult<SignOutcome>
    where
        D: DrawingContent + ?Sized,
        B: PropertyBag,
    {
        sign_document(
            doc,
            store,
            identity,
            key,
            self.clock.as_ref(),
            &self.signer,
            &self.digest,
        )
    }
}

/// Digest `doc`, sign the record and persist it.
///
/// Write order: record string, display properties, then the `Signed` flag.
/// A failure part-way leaves the flag untouched.
pub fn sign_document<D, B>(
    doc: &D,
    store: &SignatureStore<B>,
    identity: &Identity,
    key: KeyMaterial,
    clock: &dyn Clock,
    signer: &Signer,
    digest: &ContentDigest,
) -> DrawsigResult<SignOutcome>
where
    D: DrawingContent + ?Sized,
    B: PropertyBag,
{
    let span = info_span!("sign_document", username = identity.username());
    let _guard = span.enter();

    let document_digest = digest.compute(doc);
    let unsigned = SignatureRecord::unsigned(identity, clock.now(), document_digest)?;
    let signature = signer.sign(&unsigned, identity, key)?;
    let record = unsigned.attach(signature);
    let serialized = record.serialize();

    let replaced = store.set_record_string(&serialized)?.existed();
    store.set_display(record.signer_name(), record.signed_at_text())?;
    store.set_status(SignatureStatus::Signed)?;

    info!(
        method = record.method().as_str(),
        signed_at = record.signed_at_text(),
        digest = record.document_digest(),
        replaced,
        "drawing signed"
    );

    Ok(SignOutcome {
        record,
        serialized,
        replaced,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use time::macros::datetime;

    use super::*;
    use crate::errors::{DrawsigError, SigningError, StoreError};
    use crate::model::{DocumentProperty, Drawing, Sheet};
    use crate::pipeline::FixedClock;
    use crate::store::{MemoryPropertyBag, Upsert, KEY_RECORD};

    fn drawing() -> Drawing {
        Drawing::new()
            .with_sheet(Sheet::new("Sheet:1").with_field("PartName", "Bracket"))
            .with_property(DocumentProperty::Title, "Bracket Drawing")
            .with_property(DocumentProperty::PartNumber, "PN-001")
            .with_property(DocumentProperty::RevisionNumber, "A")
            .with_property(DocumentProperty::Description, "v1")
    }

    fn signer() -> DocumentSigner {
        DocumentSigner::default()
            .with_clock(Arc::new(FixedClock(datetime!(2024-03-01 08:30:00 UTC))))
    }

    #[test]
    fn golden_record() {
        let store = SignatureStore::new(MemoryPropertyBag::new());
        let id = Identity::password("alice", "Alice Liddell");
        let out = signer()
            .sign(&drawing(), &store, &id, KeyMaterial::None)
            .unwrap();

        assert_eq!(
            out.serialized,
            "Alice Liddell|alice|2024-03-01T08:30:00Z|\
             0f29e5fca71a309d0f44e8379dac83379b0d5fc504acc95e757f41130caaa40d|\
             wnHLiEZi7MCERxQUM8fLND84PQDcPfMJxSQFFly2OPA="
        );
        assert!(!out.replaced);
        assert_eq!(store.status().unwrap(), SignatureStatus::Signed);
        assert_eq!(store.record_string().unwrap(), Some(out.serialized.clone()));
        assert_eq!(store.signature_time().unwrap().as_deref(), Some("2024-03-01T08:30:00Z"));
        assert_eq!(SignatureRecord::parse(&out.serialized).unwrap(), out.record);
    }

    #[test]
    fn resign_replaces_record() {
        let store = SignatureStore::new(MemoryPropertyBag::new());
        let s = signer();
        s.sign(&drawing(), &store, &Identity::password("alice", "Alice"), KeyMaterial::None)
            .unwrap();
        let out = s
            .sign(&drawing(), &store, &Identity::password("bob", "Bob"), KeyMaterial::None)
            .unwrap();
        assert!(out.replaced);
        assert!(store.record_string().unwrap().unwrap().starts_with("Bob|bob|"));
    }

    #[test]
    fn signing_failure_leaves_store_untouched() {
        let bag = MemoryPropertyBag::new();
        let store = SignatureStore::new(&bag);
        let err = signer()
            .sign(&drawing(), &store, &Identity::certificate("alice", "Alice"), KeyMaterial::None)
            .unwrap_err();
        assert_matches!(err, DrawsigError::Signing(SigningError::MissingKey));
        assert!(bag.snapshot().is_empty());
    }

    struct RecordWriteFails(MemoryPropertyBag);

    impl PropertyBag for RecordWriteFails {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn upsert(&self, key: &str, value: &str) -> Result<Upsert, StoreError> {
            if key == KEY_RECORD {
                return Err(StoreError::io("disk full"));
            }
            self.0.upsert(key, value)
        }
    }

    #[test]
    fn status_not_set_when_record_write_fails() {
        let store = SignatureStore::new(RecordWriteFails(MemoryPropertyBag::new()));
        let err = signer()
            .sign(&drawing(), &store, &Identity::password("alice", "Alice"), KeyMaterial::None)
            .unwrap_err();
        assert_matches!(err, DrawsigError::Store(_));
        assert_eq!(store.status().unwrap(), SignatureStatus::Unsigned);
    }
}
