use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use drawsig_core::config::{validate_config, CoreConfig, NewlineMode};
use drawsig_store::FsPropertyBag;

use crate::args::{Cli, Command};
use crate::io::drawing::open_props;

mod digest;
mod edit;
mod keygen;
mod sign;
mod status;
mod unlock;
mod verify;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: CoreConfig,
    pub props: Option<PathBuf>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = CoreConfig::default();
        config.hashing.newline = NewlineMode::parse(&cli.newline)?;
        if let Some(suffix) = &cli.secret_suffix {
            config.signing.shared_secret_suffix = suffix.clone();
        }
        validate_config(&config)?;

        Ok(Self {
            config,
            props: cli.props.clone(),
        })
    }

    pub fn props_for(&self, drawing: &Path) -> FsPropertyBag {
        open_props(drawing, self.props.as_deref())
    }
}

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Command::Digest {
            drawing,
            show_canonical,
        } => digest::run(&ctx, &drawing, show_canonical)?,
        Command::Keygen {
            out,
            public,
            bits,
            force,
        } => keygen::run(&out, public.as_deref(), bits, force)?,
        Command::Sign {
            drawing,
            username,
            full_name,
            key,
            force,
            no_lock,
        } => {
            let opts = sign::SignOptions {
                username: &username,
                full_name: full_name.as_deref(),
                key: key.as_deref(),
                force,
                lock: !no_lock,
            };
            sign::run(&ctx, &drawing, &opts)?
        }
        Command::Verify { drawing, trust } => return verify::run(&ctx, &drawing, &trust),
        Command::Status { drawing } => status::run(&ctx, &drawing)?,
        Command::Edit {
            drawing,
            fields,
            properties,
            force,
        } => edit::run(&ctx, &drawing, &fields, &properties, force)?,
        Command::Unlock { drawing } => unlock::run(&ctx, &drawing)?,
    }
    Ok(ExitCode::SUCCESS)
}
