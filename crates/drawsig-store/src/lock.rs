//! Post-signing document lock.
//!
//! A signed drawing is marked locked in its property bag. The composing
//! application registers the lock's hooks and consults them before saving and
//! when the document is activated; nothing is subscribed globally.

use drawsig_core::errors::StoreError;
use drawsig_core::store::{PropertyBag, Upsert};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const KEY_LOCKED: &str = "DocumentLocked";
pub const KEY_LOCKED_AT: &str = "DocumentLockedAt";

const LOCKED: &str = "True";
const UNLOCKED: &str = "False";

/// Answer of a save hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveDecision {
    Proceed,
    Reject { reason: String },
}

impl SaveDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

/// Consulted before the host writes the document.
pub trait SaveHook {
    fn before_save(&self) -> SaveDecision;
}

/// Consulted when the document becomes active.
pub trait ActivateHook {
    fn on_activate(&self) -> Option<Notice>;
}

/// Hooks registered for one open document.
#[derive(Default)]
pub struct DocumentHooks<'a> {
    save: Vec<Box<dyn SaveHook + 'a>>,
    activate: Vec<Box<dyn ActivateHook + 'a>>,
}

impl<'a> DocumentHooks<'a> {
    pub fn new() -> Self {
        Self {
            save: Vec::new(),
            activate: Vec::new(),
        }
    }

    pub fn on_save(mut self, hook: impl SaveHook + 'a) -> Self {
        self.save.push(Box::new(hook));
        self
    }

    pub fn on_activate(mut self, hook: impl ActivateHook + 'a) -> Self {
        self.activate.push(Box::new(hook));
        self
    }

    /// First rejection wins.
    pub fn before_save(&self) -> SaveDecision {
        self.save
            .iter()
            .map(|h| h.before_save())
            .find(|d| !d.is_proceed())
            .unwrap_or(SaveDecision::Proceed)
    }

    pub fn activate(&self) -> Vec<Notice> {
        self.activate.iter().filter_map(|h| h.on_activate()).collect()
    }
}

/// Lock flag stored on a document.
#[derive(Debug)]
pub struct DocumentLock<B> {
    bag: B,
}

impl<B: PropertyBag> DocumentLock<B> {
    pub fn new(bag: B) -> Self {
        Self { bag }
    }

    pub fn lock(&self, at: OffsetDateTime) -> Result<Upsert, StoreError> {
        let res = self.bag.upsert(KEY_LOCKED, LOCKED)?;
        let at = at
            .to_offset(time::UtcOffset::UTC)
            .format(&Rfc3339)
            .map_err(|e| StoreError::backend(e.to_string()))?;
        self.bag.upsert(KEY_LOCKED_AT, &at)?;
        tracing::info!(locked_at = %at, "document locked");
        Ok(res)
    }

    /// Clear the flag. The signature record is left alone.
    pub fn unlock(&self) -> Result<bool, StoreError> {
        let was_locked = self.is_locked()?;
        self.bag.upsert(KEY_LOCKED, UNLOCKED)?;
        tracing::info!(was_locked, "document unlocked");
        Ok(was_locked)
    }

    /// Missing flag reads as unlocked; the value compares case-insensitively.
    pub fn is_locked(&self) -> Result<bool, StoreError> {
        Ok(self
            .bag
            .get(KEY_LOCKED)?
            .is_some_and(|v| v.eq_ignore_ascii_case(LOCKED)))
    }

    pub fn locked_at(&self) -> Result<Option<String>, StoreError> {
        self.bag.get(KEY_LOCKED_AT)
    }
}

impl<B: PropertyBag> SaveHook for DocumentLock<B> {
    /// Rejects when locked or when the flag cannot be read.
    fn before_save(&self) -> SaveDecision {
        match self.is_locked() {
            Ok(false) => SaveDecision::Proceed,
            Ok(true) => SaveDecision::Reject {
                reason: "document is locked by an electronic signature and cannot be modified"
                    .to_string(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "lock flag unreadable, refusing save");
                SaveDecision::Reject {
                    reason: format!("lock state could not be read: {err}"),
                }
            }
        }
    }
}

impl<B: PropertyBag> ActivateHook for DocumentLock<B> {
    fn on_activate(&self) -> Option<Notice> {
        match self.is_locked() {
            Ok(true) => Some(Notice {
                message: "this document is locked by an electronic signature; edits are not allowed"
                    .to_string(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use drawsig_core::store::MemoryPropertyBag;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn lock_unlock_cycle() {
        let bag = MemoryPropertyBag::new();
        let lock = DocumentLock::new(&bag);
        assert!(!lock.is_locked().unwrap());
        assert!(lock.before_save().is_proceed());
        assert_eq!(lock.on_activate(), None);

        lock.lock(datetime!(2024-03-01 16:30:00 +8)).unwrap();
        assert!(lock.is_locked().unwrap());
        assert_eq!(lock.locked_at().unwrap().as_deref(), Some("2024-03-01T08:30:00Z"));
        assert!(matches!(lock.before_save(), SaveDecision::Reject { .. }));
        assert!(lock.on_activate().is_some());

        assert!(lock.unlock().unwrap());
        assert!(!lock.is_locked().unwrap());
        assert_eq!(bag.get(KEY_LOCKED).unwrap().as_deref(), Some("False"));
    }

    #[test]
    fn flag_is_case_insensitive() {
        let bag = MemoryPropertyBag::new();
        bag.upsert(KEY_LOCKED, "true").unwrap();
        assert!(DocumentLock::new(&bag).is_locked().unwrap());
        bag.upsert(KEY_LOCKED, " True ").unwrap();
        assert!(!DocumentLock::new(&bag).is_locked().unwrap());
    }

    struct Broken;

    impl PropertyBag for Broken {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::io("gone"))
        }

        fn upsert(&self, _key: &str, _value: &str) -> Result<Upsert, StoreError> {
            Err(StoreError::io("gone"))
        }
    }

    #[test]
    fn unreadable_flag_refuses_save() {
        let lock = DocumentLock::new(Broken);
        assert!(!lock.before_save().is_proceed());
        assert_eq!(lock.on_activate(), None);
    }

    #[test]
    fn hooks_first_rejection_wins() {
        let free = MemoryPropertyBag::new();
        let locked = MemoryPropertyBag::new();
        DocumentLock::new(&locked)
            .lock(OffsetDateTime::UNIX_EPOCH)
            .unwrap();

        let hooks = DocumentHooks::new()
            .on_save(DocumentLock::new(&free))
            .on_save(DocumentLock::new(&locked))
            .on_activate(DocumentLock::new(&locked));
        assert!(!hooks.before_save().is_proceed());
        assert_eq!(hooks.activate().len(), 1);

        assert!(DocumentHooks::new().before_save().is_proceed());
    }
}
