//! # sync-replaces CLI
//!
//! This is the binary entry point for the `sync-replaces` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the sync and reporting a fatal error as a single `Error:` line
//!   with a non-zero exit code.
//!
//! The core application logic is defined in the `lib.rs` library crate, so the
//! binary stays a thin wrapper around it.

mod cli;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    if let Err(err) = cli.execute() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
