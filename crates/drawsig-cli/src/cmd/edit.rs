use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use drawsig_core::model::DocumentProperty;
use drawsig_store::{DocumentHooks, DocumentLock, SaveDecision};
use serde::Serialize;
use termcolor::WriteColor;

use super::Context;
use crate::io::drawing::{read_drawing, write_drawing};
use crate::output::{self, Render};

#[derive(Debug, Serialize)]
pub struct EditOut {
    pub drawing: String,
    pub fields_changed: usize,
    pub properties_changed: usize,
    pub forced: bool,
    pub notices: Vec<String>,
}

impl Render for EditOut {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        for n in &self.notices {
            output::field(out, "notice", n)?;
        }
        let word = if self.forced { "SAVED (forced)" } else { "SAVED" };
        output::verdict(
            out,
            true,
            word,
            &format!(
                "{}: {} field(s), {} property value(s) changed",
                self.drawing, self.fields_changed, self.properties_changed
            ),
        )
    }
}

pub fn run(
    ctx: &Context,
    drawing_path: &Path,
    fields: &[(String, String)],
    properties: &[(String, String)],
    force: bool,
) -> Result<()> {
    if fields.is_empty() && properties.is_empty() {
        bail!("nothing to edit; pass --field NAME=TEXT or --property NAME=VALUE");
    }

    let mut drawing = read_drawing(drawing_path)?;
    let bag = ctx.props_for(drawing_path);
    let hooks = DocumentHooks::new()
        .on_save(DocumentLock::new(&bag))
        .on_activate(DocumentLock::new(&bag));

    let notices: Vec<String> = hooks.activate().into_iter().map(|n| n.message).collect();

    let mut fields_changed = 0;
    for (name, text) in fields {
        let n = drawing.set_field(name, text);
        if n == 0 {
            bail!("no title-block field named `{name}`");
        }
        fields_changed += n;
    }
    let before = drawing.properties.clone();
    for (name, value) in properties {
        match DocumentProperty::from_name(name) {
            Some(p) => drawing.set_property(p, value.as_str()),
            None => {
                drawing.properties.insert(name.clone(), value.clone());
            }
        }
    }

    let properties_changed = drawing
        .properties
        .iter()
        .filter(|(name, value)| before.get(*name) != Some(*value))
        .count();

    let forced = match hooks.before_save() {
        SaveDecision::Proceed => false,
        SaveDecision::Reject { reason } if !force => bail!("save refused: {reason}"),
        SaveDecision::Reject { reason } => {
            tracing::warn!(%reason, "saving over a lock");
            true
        }
    };

    write_drawing(drawing_path, &drawing)?;

    output::print(&EditOut {
        drawing: drawing_path.display().to_string(),
        fields_changed,
        properties_changed,
        forced,
        notices,
    })
}
