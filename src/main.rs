//! # xmake CLI
//!
//! This is the binary entry point for the `xmake` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating failures into a message on stderr and a category-specific
//!   exit code (see [`xmake::exit_codes`]).
//!
//! The build logic is defined in the `lib.rs` library crate, ensuring that the
//! binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use xmake::exit_codes;

fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // `--help` and `--version` also arrive here, on stdout.
            let _ = err.print();
            let code = if err.use_stderr() {
                exit_codes::USAGE
            } else {
                exit_codes::SUCCESS
            };
            return ExitCode::from(code);
        }
    };
    match cli.execute() {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<xmake::error::Error>()
                .map(|e| e.exit_code())
                .unwrap_or(exit_codes::ERROR);
            ExitCode::from(code)
        }
    }
}
