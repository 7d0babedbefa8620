//
// main.rs
// pxtools
//
// Binary entry point that hands the process arguments to the CLI layer and returns its exit code.
//
// Thales Matheus Mendonça Santos - November 2025

use std::process::ExitCode;

use pxtools::cli;

fn main() -> ExitCode {
    ExitCode::from(cli::run())
}
