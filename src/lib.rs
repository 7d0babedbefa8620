//
// lib.rs
// pxtools
//
// Exposes the crate's modules and re-exports the CLI entry point for both binary and library consumers.
//
// Thales Matheus Mendonça Santos - November 2025

// Public surface of the library: one module per tool, plus the image I/O and toolkit layers they share.
pub mod cli;
pub mod cylinder;
pub mod error;
pub mod imageio;
pub mod info;
pub mod models;
pub mod morphology;
pub mod toolkit;

pub use cli::{run as run_cli, run_from, Cli, Commands};
pub use error::{ToolError, ToolkitError};
pub use imageio::{ImageIo, ImageIoError};
