//! drawsig-store
//!
//! Storage collaborators for drawsig outside the host CAD application:
//! - `FsPropertyBag`: a drawing's property bag kept in a JSON sidecar file
//! - `DocumentLock`: the post-signing lock flag and its save/activate hooks

pub mod error;
pub mod fs;
pub mod lock;

pub use crate::error::FsStoreError;
pub use crate::fs::{sidecar_path, FsPropertyBag};
pub use crate::lock::{
    ActivateHook, DocumentHooks, DocumentLock, Notice, SaveDecision, SaveHook, KEY_LOCKED,
    KEY_LOCKED_AT,
};
