//! Storage contract between the core and the host document.
//!
//! The host keeps string properties on the drawing (a property bag). The core
//! needs only `get` and `upsert`; `SignatureStore` layers the fixed signature
//! keys on top.
//!
//! `upsert` reports whether a value already existed instead of failing on a
//! missing key, so absence is never reported as an error.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::errors::StoreError;
use crate::model::SignatureStatus;

/// Full serialized signature record.
pub const KEY_RECORD: &str = "ElectronicSignatureData";
/// `Signed` / `Unsigned`.
pub const KEY_STATUS: &str = "SignatureStatus";
/// Display copy of the signer's name.
pub const KEY_SIGNER_NAME: &str = "SignerName";
/// Display copy of the signing time.
pub const KEY_SIGNATURE_TIME: &str = "SignatureTime";

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

impl Upsert {
    pub fn existed(&self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// String properties attached to a document.
pub trait PropertyBag {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn upsert(&self, key: &str, value: &str) -> Result<Upsert, StoreError>;
}

impl<B: PropertyBag + ?Sized> PropertyBag for &B {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn upsert(&self, key: &str, value: &str) -> Result<Upsert, StoreError> {
        (**self).upsert(key, value)
    }
}

/// Typed access to the signature properties of one document.
#[derive(Debug)]
pub struct SignatureStore<B> {
    bag: B,
}

impl<B: PropertyBag> SignatureStore<B> {
    pub fn new(bag: B) -> Self {
        Self { bag }
    }

    pub fn bag(&self) -> &B {
        &self.bag
    }

    pub fn into_inner(self) -> B {
        self.bag
    }

    /// The stored record string; empty values read as absent.
    pub fn record_string(&self) -> Result<Option<String>, StoreError> {
        Ok(self.bag.get(KEY_RECORD)?.filter(|s| !s.is_empty()))
    }

    pub fn set_record_string(&self, value: &str) -> Result<Upsert, StoreError> {
        self.bag.upsert(KEY_RECORD, value)
    }

    pub fn status(&self) -> Result<SignatureStatus, StoreError> {
        Ok(self
            .bag
            .get(KEY_STATUS)?
            .map(|s| SignatureStatus::from_stored(&s))
            .unwrap_or_default())
    }

    pub fn set_status(&self, status: SignatureStatus) -> Result<Upsert, StoreError> {
        self.bag.upsert(KEY_STATUS, status.as_str())
    }

    /// Human-readable copies of the signer and time for the host's property panel.
    pub fn set_display(&self, signer_name: &str, signed_at: &str) -> Result<(), StoreError> {
        self.bag.upsert(KEY_SIGNER_NAME, signer_name)?;
        self.bag.upsert(KEY_SIGNATURE_TIME, signed_at)?;
        Ok(())
    }

    pub fn signer_name(&self) -> Result<Option<String>, StoreError> {
        self.bag.get(KEY_SIGNER_NAME)
    }

    pub fn signature_time(&self) -> Result<Option<String>, StoreError> {
        self.bag.get(KEY_SIGNATURE_TIME)
    }
}

/// Property bag held in memory.
#[derive(Debug, Default)]
pub struct MemoryPropertyBag {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.read().clone()
    }
}

impl PropertyBag for MemoryPropertyBag {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn upsert(&self, key: &str, value: &str) -> Result<Upsert, StoreError> {
        let prior = self
            .values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(if prior.is_some() {
            Upsert::Updated
        } else {
            Upsert::Inserted
        })
    }
}
