//! Unpack CLI - Command-line utility for policy-driven archive extraction.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use env_logger::Env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level())).init();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match commands::extract::execute(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}
