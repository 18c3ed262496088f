use std::io;
use std::path::Path;

use anyhow::Result;
use drawsig_core::determinism::ContentDigest;
use serde::Serialize;
use termcolor::WriteColor;

use super::Context;
use crate::io::drawing::read_drawing;
use crate::output::{self, Render};

#[derive(Debug, Serialize)]
pub struct DigestOut {
    pub drawing: String,
    pub digest: String,
    pub algorithm: &'static str,
    pub newline: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

impl Render for DigestOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        output::field(out, "drawing", &self.drawing)?;
        output::field(out, "digest", &self.digest)?;
        output::field(out, "algorithm", &format!("{} ({})", self.algorithm, self.newline))?;
        if let Some(text) = &self.canonical {
            writeln!(out)?;
            write!(out, "{text}")?;
        }
        Ok(())
    }
}

pub fn run(ctx: &Context, drawing_path: &Path, show_canonical: bool) -> Result<()> {
    let drawing = read_drawing(drawing_path)?;
    let hasher = ContentDigest::new(ctx.config.hashing.clone());

    output::print(&DigestOut {
        drawing: drawing_path.display().to_string(),
        digest: hasher.compute(&drawing),
        algorithm: ctx.config.hashing.algorithm.as_str(),
        newline: ctx.config.hashing.newline.as_str(),
        canonical: show_canonical.then(|| hasher.canonical_text(&drawing)),
    })
}
