//! # june CLI
//!
//! Command-line interface for the June portfolio knowledge assistant.
//!
//! This binary provides human-friendly access to `june-core` functionality.
//! Run `june --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
