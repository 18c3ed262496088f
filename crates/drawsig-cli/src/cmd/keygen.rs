use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use drawsig_core::crypto::RsaSigningKey;
use serde::Serialize;
use termcolor::WriteColor;

use crate::io::keys::write_key_file;
use crate::output::{self, Render};

#[derive(Debug, Serialize)]
pub struct KeygenOut {
    pub private_key: String,
    pub public_key: Option<String>,
    pub bits: usize,
    pub fingerprint: String,
}

impl Render for KeygenOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        output::field(out, "private key", &self.private_key)?;
        if let Some(p) = &self.public_key {
            output::field(out, "public key", p)?;
        }
        output::field(out, "bits", &self.bits.to_string())?;
        output::field(out, "fingerprint", &self.fingerprint)
    }
}

pub fn run(out: &Path, public: Option<&Path>, bits: usize, force: bool) -> Result<()> {
    if bits < 2048 {
        bail!("refusing to generate a {bits}-bit key; use at least 2048");
    }

    tracing::info!(bits, "generating RSA key");
    let key = RsaSigningKey::generate(bits)?;
    let verifying = key.verifying_key();
    let fingerprint = verifying.fingerprint()?;

    let pem = key.to_pkcs8_pem()?;
    write_key_file(out, &pem, true, force)?;
    if let Some(public) = public {
        write_key_file(public, &verifying.to_spki_pem()?, false, force)?;
    }

    output::print(&KeygenOut {
        private_key: out.display().to_string(),
        public_key: public.map(|p| p.display().to_string()),
        bits: key.bits(),
        fingerprint,
    })
}
