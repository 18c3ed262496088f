use std::io;
use std::path::Path;

use anyhow::Result;
use drawsig_core::store::SignatureStore;
use drawsig_store::DocumentLock;
use serde::Serialize;
use termcolor::WriteColor;

use super::Context;
use crate::output::{self, Render};

#[derive(Debug, Serialize)]
pub struct StatusOut {
    pub drawing: String,
    pub props: String,
    pub status: &'static str,
    pub has_record: bool,
    pub signer_name: Option<String>,
    pub signature_time: Option<String>,
    pub locked: bool,
    pub locked_at: Option<String>,
}

impl Render for StatusOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        output::field(out, "drawing", &self.drawing)?;
        output::field(out, "status", self.status)?;
        if let Some(s) = &self.signer_name {
            output::field(out, "signer", s)?;
        }
        if let Some(t) = &self.signature_time {
            output::field(out, "time", t)?;
        }
        let locked = match (&self.locked, &self.locked_at) {
            (true, Some(at)) => format!("yes (since {at})"),
            (true, None) => "yes".to_string(),
            (false, _) => "no".to_string(),
        };
        output::field(out, "locked", &locked)
    }
}

pub fn run(ctx: &Context, drawing_path: &Path) -> Result<()> {
    let bag = ctx.props_for(drawing_path);
    let store = SignatureStore::new(&bag);
    let lock = DocumentLock::new(&bag);
    let locked = lock.is_locked()?;

    output::print(&StatusOut {
        drawing: drawing_path.display().to_string(),
        props: bag.path().display().to_string(),
        status: store.status()?.as_str(),
        has_record: store.record_string()?.is_some(),
        signer_name: store.signer_name()?,
        signature_time: store.signature_time()?,
        locked,
        locked_at: if locked { lock.locked_at()? } else { None },
    })
}
