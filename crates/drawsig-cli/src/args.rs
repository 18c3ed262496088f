use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "drawsig", version, about = "Electronic signatures for engineering drawings")]
pub struct Cli {
    /// Emit JSON output on stdout (and JSON logs on stderr).
    #[arg(long, global = true)]
    pub json: bool,

    /// Suffix appended to the username to derive the shared-secret MAC key.
    #[arg(long, global = true, env = "DRAWSIG_SECRET_SUFFIX", hide_env_values = true)]
    pub secret_suffix: Option<String>,

    /// Line terminator used by the content digest: lf|crlf
    #[arg(long, global = true, default_value = "lf")]
    pub newline: String,

    /// Property file holding the signature (default: <drawing>.props.json)
    #[arg(long, global = true)]
    pub props: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute the content digest of a drawing.
    Digest {
        drawing: PathBuf,

        /// Also print the exact text that is hashed.
        #[arg(long)]
        show_canonical: bool,
    },

    /// Generate an RSA signing key (PKCS#8 PEM).
    Keygen {
        #[arg(long)]
        out: PathBuf,

        /// Also write the public key (SPKI PEM) here.
        #[arg(long)]
        public: Option<PathBuf>,

        #[arg(long, default_value_t = 2048)]
        bits: usize,

        /// Overwrite existing key files.
        #[arg(long)]
        force: bool,
    },

    /// Sign a drawing and lock it.
    Sign {
        drawing: PathBuf,

        #[arg(long)]
        username: String,

        /// Display name recorded in the signature (default: the username).
        #[arg(long)]
        full_name: Option<String>,

        /// PKCS#8 PEM private key; signs with RSA instead of the shared secret.
        #[arg(long)]
        key: Option<PathBuf>,

        /// Replace an existing signature.
        #[arg(long)]
        force: bool,

        /// Leave the drawing unlocked after signing.
        #[arg(long)]
        no_lock: bool,
    },

    /// Verify the stored signature against the current drawing.
    Verify {
        drawing: PathBuf,

        /// SPKI PEM public key trusted for RSA signatures (repeatable).
        #[arg(long = "trust")]
        trust: Vec<PathBuf>,
    },

    /// Show signature and lock state.
    Status { drawing: PathBuf },

    /// Change title-block fields or document properties.
    Edit {
        drawing: PathBuf,

        /// NAME=TEXT for every title-block field called NAME (repeatable).
        #[arg(long = "field", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,

        /// NAME=VALUE document property (repeatable).
        #[arg(long = "property", value_parser = parse_assignment)]
        properties: Vec<(String, String)>,

        /// Save even if the drawing is locked.
        #[arg(long)]
        force: bool,
    },

    /// Clear the post-signing lock.
    Unlock { drawing: PathBuf },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("Part Number=PN-002").unwrap(),
            ("Part Number".to_string(), "PN-002".to_string())
        );
        assert_eq!(parse_assignment("k=a=b").unwrap().1, "a=b");
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
