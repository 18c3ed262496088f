use std::process::ExitCode;

use clap::Parser;

mod args;
mod cmd;
mod io;
mod logging;
mod output;

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    output::init(cli.json);
    logging::init(cli.verbose, cli.json);

    match cmd::dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            output::eprintln_line(&format!("error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
