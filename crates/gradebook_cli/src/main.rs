//! `gradebook` command-line entry point.
//!
//! Prints exactly one JSON document on stdout. Failures print
//! `{"error": ...}` and exit with status 2 for a missing resource, 1 otherwise.

mod cli;
mod commands;

use clap::Parser;
use serde_json::json;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match commands::run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", json!({ "error": format!("{err:#}") }));
            ExitCode::from(commands::failure_status(&err))
        }
    }
}
