//! Property bag persisted as a JSON sidecar next to the drawing.
//!
//! `bracket.json` keeps its properties in `bracket.json.props.json`.
//! Writes go to `<sidecar>.tmp` first and are renamed into place, so a crash
//! never leaves a half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use drawsig_core::errors::StoreError;
use drawsig_core::store::{PropertyBag, Upsert};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::FsStoreError;

const SIDECAR_SUFFIX: &str = "props.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PropertyFile {
    #[serde(default = "format_version")]
    version: u32,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

fn format_version() -> u32 {
    FORMAT_VERSION
}

/// Sidecar path for a drawing file.
pub fn sidecar_path(drawing: &Path) -> PathBuf {
    let mut name = drawing
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(SIDECAR_SUFFIX);
    drawing.with_file_name(name)
}

/// File-backed property bag.
#[derive(Debug)]
pub struct FsPropertyBag {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FsPropertyBag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Bag stored in the sidecar of `drawing`.
    pub fn for_drawing(drawing: &Path) -> Self {
        Self::new(sidecar_path(drawing))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All properties. A missing file reads as empty.
    pub fn load(&self) -> Result<BTreeMap<String, String>, FsStoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let file: PropertyFile =
                    serde_json::from_slice(&bytes).map_err(|source| FsStoreError::Corrupt {
                        path: self.path.clone(),
                        source,
                    })?;
                if file.version > FORMAT_VERSION {
                    return Err(FsStoreError::UnsupportedVersion {
                        path: self.path.clone(),
                        version: file.version,
                    });
                }
                Ok(file.properties)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(FsStoreError::io(&self.path, e)),
        }
    }

    fn save(&self, properties: BTreeMap<String, String>) -> Result<(), FsStoreError> {
        let file = PropertyFile {
            version: FORMAT_VERSION,
            properties,
        };
        let mut data = serde_json::to_vec_pretty(&file)?;
        data.push(b'\n');

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &data).map_err(|e| FsStoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| FsStoreError::io(&self.path, e))?;
        Ok(())
    }
}

impl PropertyBag for FsPropertyBag {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        tracing::trace!(path = %self.path.display(), key, "FsPropertyBag::get");
        Ok(self.load()?.remove(key))
    }

    fn upsert(&self, key: &str, value: &str) -> Result<Upsert, StoreError> {
        let _guard = self.write_lock.lock();
        let mut values = self.load()?;
        let prior = values.insert(key.to_string(), value.to_string());
        self.save(values)?;
        tracing::debug!(
            path = %self.path.display(),
            key,
            existed = prior.is_some(),
            "FsPropertyBag::upsert"
        );
        Ok(if prior.is_some() {
            Upsert::Updated
        } else {
            Upsert::Inserted
        })
    }
}

#[cfg(test)]
mod tests {
    use drawsig_core::model::SignatureStatus;
    use drawsig_core::store::SignatureStore;

    use super::*;

    #[test]
    fn sidecar_naming() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/a/bracket.drawing.json")),
            PathBuf::from("/tmp/a/bracket.drawing.json.props.json")
        );
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let bag = FsPropertyBag::new(dir.path().join("none.json"));
        assert_eq!(bag.get("SignatureStatus").unwrap(), None);
        assert!(!bag.path().exists());
    }

    #[test]
    fn upsert_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.props.json");

        let bag = FsPropertyBag::new(&path);
        assert_eq!(bag.upsert("k", "1").unwrap(), Upsert::Inserted);
        assert_eq!(bag.upsert("k", "2").unwrap(), Upsert::Updated);
        assert!(!dir.path().join("d.props.json.tmp").exists());

        let again = FsPropertyBag::new(&path);
        assert_eq!(again.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn works_under_signature_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignatureStore::new(FsPropertyBag::for_drawing(&dir.path().join("x.json")));
        store.set_status(SignatureStatus::Signed).unwrap();
        assert_eq!(store.status().unwrap(), SignatureStatus::Signed);
    }

    #[test]
    fn corrupt_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();
        let err = FsPropertyBag::new(&path).get("k").unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn newer_format_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.json");
        fs::write(&path, br#"{"version": 9, "properties": {}}"#).unwrap();
        assert!(matches!(
            FsPropertyBag::new(&path).load(),
            Err(FsStoreError::UnsupportedVersion { version: 9, .. })
        ));
    }
}
