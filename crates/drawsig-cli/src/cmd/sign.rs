use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use drawsig_core::crypto::{KeyMaterial, RsaSigningKey};
use drawsig_core::errors::SigningError;
use drawsig_core::model::{Identity, IdentityProvider, SignatureStatus};
use drawsig_core::pipeline::DocumentSigner;
use drawsig_core::record::SignatureMethod;
use drawsig_core::store::SignatureStore;
use drawsig_store::DocumentLock;
use serde::Serialize;
use termcolor::WriteColor;
use time::OffsetDateTime;

use super::Context;
use crate::io::drawing::read_drawing;
use crate::io::keys::read_private_key_pem;
use crate::output::{self, Render};

pub struct SignOptions<'a> {
    pub username: &'a str,
    pub full_name: Option<&'a str>,
    pub key: Option<&'a Path>,
    pub force: bool,
    pub lock: bool,
}

/// Identity taken from command-line flags. A key file makes it a certificate identity.
struct FlagIdentity<'a> {
    username: &'a str,
    full_name: &'a str,
    key: Option<&'a Path>,
}

impl IdentityProvider for FlagIdentity<'_> {
    fn authenticate(&mut self) -> Result<(Identity, KeyMaterial), SigningError> {
        let Some(path) = self.key else {
            return Ok((Identity::password(self.username, self.full_name), KeyMaterial::None));
        };
        let pem = read_private_key_pem(path)
            .map_err(|e| SigningError::KeyUnreadable(format!("{}: {e}", path.display())))?;
        let key = RsaSigningKey::from_pkcs8_pem(&pem)?;
        Ok((
            Identity::certificate(self.username, self.full_name),
            KeyMaterial::Rsa(key),
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct SignOut {
    pub drawing: String,
    pub signer: String,
    pub username: String,
    pub signed_at: String,
    pub method: &'static str,
    pub key_ref: Option<String>,
    pub digest: String,
    pub replaced: bool,
    pub locked: bool,
}

impl Render for SignOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        let word = if self.replaced { "RE-SIGNED" } else { "SIGNED" };
        output::verdict(out, true, word, &self.drawing)?;
        output::field(out, "signer", &format!("{} ({})", self.signer, self.username))?;
        output::field(out, "time", &self.signed_at)?;
        output::field(out, "method", self.method)?;
        if let Some(k) = &self.key_ref {
            output::field(out, "key", k)?;
        }
        output::field(out, "digest", &self.digest)?;
        output::field(out, "locked", if self.locked { "yes" } else { "no" })
    }
}

pub fn run(ctx: &Context, drawing_path: &Path, opts: &SignOptions<'_>) -> Result<()> {
    if opts.username.trim().is_empty() {
        bail!("--username must not be empty");
    }

    let drawing = read_drawing(drawing_path)?;
    let bag = ctx.props_for(drawing_path);
    let store = SignatureStore::new(&bag);

    if store.status()? == SignatureStatus::Signed && !opts.force {
        bail!(
            "{} is already signed by {}; pass --force to replace the signature",
            drawing_path.display(),
            store.signer_name()?.unwrap_or_else(|| "an unknown signer".to_string())
        );
    }

    let mut provider = FlagIdentity {
        username: opts.username,
        full_name: opts.full_name.unwrap_or(opts.username),
        key: opts.key,
    };
    let (identity, key) = provider.authenticate()?;

    let outcome = DocumentSigner::new(&ctx.config).sign(&drawing, &store, &identity, key)?;

    if opts.lock {
        DocumentLock::new(&bag).lock(OffsetDateTime::now_utc())?;
    }

    let record = &outcome.record;
    output::print(&SignOut {
        drawing: drawing_path.display().to_string(),
        signer: record.signer_name().to_string(),
        username: record.signer_username().to_string(),
        signed_at: record.signed_at_text().to_string(),
        method: record.method().as_str(),
        key_ref: match record.method() {
            SignatureMethod::RsaSha256 { key_ref } => Some(key_ref.clone()),
            SignatureMethod::Hmac => None,
        },
        digest: record.document_digest().to_string(),
        replaced: outcome.replaced,
        locked: opts.lock,
    })
}
