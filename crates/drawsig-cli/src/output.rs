use std::io::{self, Write};
use std::sync::OnceLock;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn init(json: bool) {
    let _ = JSON_MODE.set(json);
}

pub fn is_json() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

/// Human-readable rendering of a command result.
pub trait Render {
    fn render(&self, out: &mut dyn WriteColor) -> io::Result<()>;
}

pub fn print<T: Serialize + Render>(value: &T) -> anyhow::Result<()> {
    if is_json() {
        let s = serde_json::to_string_pretty(value)?;
        println!("{s}");
        return Ok(());
    }
    let mut out = stdout();
    value.render(&mut out)?;
    out.reset()?;
    Ok(())
}

/// `label: value` line.
pub fn field(out: &mut dyn WriteColor, label: &str, value: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{label:>12}")?;
    out.reset()?;
    writeln!(out, "  {value}")
}

/// A coloured status word followed by a message.
pub fn verdict(out: &mut dyn WriteColor, ok: bool, word: &str, message: &str) -> io::Result<()> {
    let color = if ok { Color::Green } else { Color::Red };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{word}")?;
    out.reset()?;
    writeln!(out, "  {message}")
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}
