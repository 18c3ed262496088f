use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use drawsig_core::crypto::{RsaVerifyingKey, TrustedKeys};
use zeroize::Zeroizing;

pub fn read_trusted_keys(paths: &[impl AsRef<Path>]) -> Result<TrustedKeys> {
    let mut trusted = TrustedKeys::new();
    for path in paths {
        let path = path.as_ref();
        let pem = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let key = RsaVerifyingKey::from_spki_pem(&pem)
            .with_context(|| format!("unusable public key {}", path.display()))?;
        let fingerprint = trusted.insert(key)?;
        tracing::debug!(path = %path.display(), %fingerprint, "trusted key loaded");
    }
    Ok(trusted)
}

/// Private key text, wiped when dropped.
pub fn read_private_key_pem(path: &Path) -> io::Result<Zeroizing<String>> {
    fs::read_to_string(path).map(Zeroizing::new)
}

/// Write `contents` to a new file; refuses to overwrite unless `force`.
/// Private keys are created owner-only on unix.
pub fn write_key_file(path: &Path, contents: &str, private: bool, force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            bail!("{} already exists (use --force to overwrite)", path.display())
        }
        Err(e) => return Err(e).with_context(|| format!("failed to create {}", path.display())),
    };

    // `mode` only applies on creation; an overwritten file keeps its old bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private && force {
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
