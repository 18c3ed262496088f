use std::io;
use std::path::Path;

use anyhow::Result;
use drawsig_store::DocumentLock;
use serde::Serialize;
use termcolor::WriteColor;

use super::Context;
use crate::output::{self, Render};

#[derive(Debug, Serialize)]
pub struct UnlockOut {
    pub drawing: String,
    pub was_locked: bool,
}

impl Render for UnlockOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        let msg = if self.was_locked { "lock cleared" } else { "was not locked" };
        output::verdict(out, true, "UNLOCKED", &format!("{} ({msg})", self.drawing))
    }
}

pub fn run(ctx: &Context, drawing_path: &Path) -> Result<()> {
    let bag = ctx.props_for(drawing_path);
    let was_locked = DocumentLock::new(&bag).unlock()?;

    output::print(&UnlockOut {
        drawing: drawing_path.display().to_string(),
        was_locked,
    })
}
