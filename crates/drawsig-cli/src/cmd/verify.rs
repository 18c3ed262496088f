use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use drawsig_core::pipeline::{VerificationOutcome, Verifier};
use drawsig_core::record::SignatureMethod;
use drawsig_core::store::SignatureStore;
use serde::Serialize;
use termcolor::WriteColor;
use time::format_description::well_known::Rfc3339;

use super::Context;
use crate::io::drawing::read_drawing;
use crate::io::keys::read_trusted_keys;
use crate::output::{self, Render};

#[derive(Debug, Serialize)]
pub struct VerifyOut {
    pub verified: bool,
    pub reason: &'static str,
    pub message: &'static str,
    pub signer_name: Option<String>,
    pub signer_username: Option<String>,
    pub signed_at: Option<String>,
    pub method: Option<&'static str>,
    pub key_ref: Option<String>,
    pub detail: Option<String>,
}

impl From<&VerificationOutcome> for VerifyOut {
    fn from(o: &VerificationOutcome) -> Self {
        Self {
            verified: o.verified,
            reason: o.reason.as_str(),
            message: o.reason.message(),
            signer_name: o.signer_name.clone(),
            signer_username: o.signer_username.clone(),
            signed_at: o.signed_at.and_then(|t| t.format(&Rfc3339).ok()),
            method: o.method.as_ref().map(SignatureMethod::as_str),
            key_ref: match &o.method {
                Some(SignatureMethod::RsaSha256 { key_ref }) => Some(key_ref.clone()),
                _ => None,
            },
            detail: o.detail.clone(),
        }
    }
}

impl Render for VerifyOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        output::verdict(out, self.verified, self.reason, self.message)?;
        if let Some(name) = &self.signer_name {
            let who = match &self.signer_username {
                Some(u) => format!("{name} ({u})"),
                None => name.clone(),
            };
            output::field(out, "signer", &who)?;
        }
        if let Some(t) = &self.signed_at {
            output::field(out, "time", t)?;
        }
        if let Some(m) = self.method {
            output::field(out, "method", m)?;
        }
        if let Some(d) = &self.detail {
            output::field(out, "detail", d)?;
        }
        Ok(())
    }
}

/// Exit status is success only for a valid signature.
pub fn run(ctx: &Context, drawing_path: &Path, trust: &[PathBuf]) -> Result<ExitCode> {
    let drawing = read_drawing(drawing_path)?;
    let trusted = read_trusted_keys(trust)?;
    let bag = ctx.props_for(drawing_path);

    let outcome = Verifier::new(&ctx.config)
        .with_trusted_keys(trusted)
        .verify_stored(&drawing, &SignatureStore::new(&bag));

    output::print(&VerifyOut::from(&outcome))?;
    Ok(if outcome.verified {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
