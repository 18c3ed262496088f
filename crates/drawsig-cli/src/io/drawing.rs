use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use drawsig_core::model::Drawing;
use drawsig_store::{sidecar_path, FsPropertyBag};

pub fn read_drawing<P: AsRef<Path>>(path: P) -> Result<Drawing> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let drawing: Drawing =
        serde_json::from_str(&raw).map_err(|e| anyhow!("invalid drawing json in {}: {e}", path.display()))?;
    Ok(drawing)
}

/// Write via a temp file and rename.
pub fn write_drawing<P: AsRef<Path>>(path: P, drawing: &Drawing) -> Result<()> {
    let path = path.as_ref();
    let mut data = serde_json::to_vec_pretty(drawing)?;
    data.push(b'\n');

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, &data).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Property bag for `drawing`, honouring `--props`.
pub fn open_props(drawing: &Path, props: Option<&Path>) -> FsPropertyBag {
    let path = props.map(Path::to_path_buf).unwrap_or_else(|| sidecar_path(drawing));
    tracing::debug!(props = %path.display(), "using property file");
    FsPropertyBag::new(path)
}
