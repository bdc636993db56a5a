//! # Legacy Link CLI
//!
//! This is the binary entry point for the `legacy-link` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating the command result into a process exit code: 0 for a
//!   clean run, 1 for a fatal error, 3 when the run completed with
//!   recorded conflicts (2 is reserved for clap usage errors).
//!
//! The core application logic is defined in the `lib.rs` library crate,
//! ensuring that the binary is a thin wrapper around the reusable library
//! functionality.

mod cli;
mod commands;

use clap::Parser;

use legacy_link::exit_codes;

fn main() {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            std::process::exit(exit_codes::ERROR);
        }
    }
}
