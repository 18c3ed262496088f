use std::path::PathBuf;

use drawsig_core::errors::StoreError;
use thiserror::Error;

/// Errors from the file-backed property store.
#[derive(Debug, Error)]
pub enum FsStoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("property file {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("property file {} has format version {version}, newer than supported", path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("property serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl FsStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<FsStoreError> for StoreError {
    fn from(err: FsStoreError) -> Self {
        match err {
            FsStoreError::Io { .. } => StoreError::io(err.to_string()),
            FsStoreError::Corrupt { .. }
            | FsStoreError::UnsupportedVersion { .. }
            | FsStoreError::Serialize(_) => {
                StoreError::backend(err.to_string())
            }
        }
    }
}
