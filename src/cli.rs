//
// cli.rs
// pxtools
//
// Defines the CLI surface with Clap, accepts the single-dash option style and maps outcomes to exit codes.
//
// Thales Matheus Mendonça Santos - November 2025

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cylinder::{self, CylinderParameters};
use crate::imageio::{DicomFormat, ImageIo};
use crate::info;
use crate::morphology::{self, RawParameters};

/// Long options that are also accepted with a single dash (`-in`, `-op`, ...).
const LEGACY_OPTIONS: [&str; 11] = [
    "in", "out", "op", "type", "r", "z", "bc", "bin", "a", "opct", "c",
];

const MORPHOLOGY_HELP: &str = "\
Options -bc, -a only apply to the grayscale type; -bin only to the binary type.
  -bc    boundary value; defaults to the type maximum for erosion and the type minimum for dilation
  -bin   foreground and background values, default 1 0
  -a     gradient algorithm: 0 = BASIC, 1 = HISTO, 2 = ANCHOR, 3 = VHGW (default 0)
Supported: 2D, 3D, (unsigned) char, (unsigned) short.

Examples:
  pxtools morphology -in scan.mhd -op erosion -r 2
  pxtools morphology -in mask.mhd -op opening -type binary -r 1 2 2 -bin 255 0 -z
  pxtools morphology -in scan.mhd -op gradient -r 1 -a 3 -out edges.mhd";

const CYLINDER_HELP: &str = "\
The center is an index into the reference image; the radius is in physical units.
The cylinder axis follows the last image axis. Supported: 2D, 3D.

Example:
  pxtools create-cylinder -in reference.mhd -out cylinder.mhd -c 32 32 0 -r 12.5";

/// Command-line interface: one verb per tool, dispatched to the library modules.
#[derive(Parser)]
#[command(name = "pxtools", version)]
#[command(about = "Morphology and mask tools for N-dimensional images", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Erosion, dilation, opening, closing or gradient with a ball structuring element
    #[command(arg_required_else_help = true, after_help = MORPHOLOGY_HELP)]
    Morphology {
        /// Input image
        #[arg(long = "in", value_name = "FILE")]
        input: Option<PathBuf>,
        /// erosion, dilation, opening, closing or gradient
        #[arg(long = "op")]
        operation: Option<String>,
        /// grayscale, binary or parabolic [default: grayscale]
        #[arg(long = "type")]
        element_class: Option<String>,
        /// Output image [default: <input>_<op>_<type>.<ext>]
        #[arg(long = "out", value_name = "FILE")]
        output: Option<PathBuf>,
        /// Radius, one value or one per axis
        #[arg(long = "r", num_args = 1.., allow_negative_numbers = true)]
        radius: Option<Vec<i64>>,
        /// Write compressed output
        #[arg(long = "z")]
        compress: bool,
        /// Boundary value
        #[arg(long = "bc", allow_negative_numbers = true)]
        boundary: Option<String>,
        /// Foreground and background values
        #[arg(long = "bin", num_args = 1.., allow_negative_numbers = true)]
        binary_values: Option<Vec<String>>,
        /// Gradient algorithm
        #[arg(long = "a", allow_negative_numbers = true)]
        algorithm: Option<i64>,
        /// Override the component type read from the input
        #[arg(long = "opct")]
        component_type: Option<String>,
    },
    /// Write a cylinder mask on the grid of a reference image
    #[command(arg_required_else_help = true, after_help = CYLINDER_HELP)]
    CreateCylinder {
        /// Reference image
        #[arg(long = "in", value_name = "FILE")]
        input: Option<PathBuf>,
        /// Output image
        #[arg(long = "out", value_name = "FILE")]
        output: Option<PathBuf>,
        /// Center index, one value per axis
        #[arg(long = "c", num_args = 1.., allow_negative_numbers = true)]
        center: Option<Vec<i64>>,
        /// Radius in physical units
        #[arg(long = "r", allow_negative_numbers = true)]
        radius: Option<f64>,
        /// Write compressed output
        #[arg(long = "z")]
        compress: bool,
    },
    /// Print the image properties the tools act on
    Info {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

/// Rewrites `-in` style options to `--in` so clap parses them as long options.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str().and_then(|s| s.strip_prefix('-')) {
            Some(name) if LEGACY_OPTIONS.contains(&name) => OsString::from(format!("--{}", name)),
            _ => arg,
        })
        .collect()
}

/// Parses the process arguments and runs the selected tool. Returns the exit code.
pub fn run() -> u8 {
    run_from(std::env::args_os())
}

/// 0 on success or when help/version was shown, 1 on any failure.
pub fn run_from<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = normalize_legacy_flags(args.into_iter().map(Into::into));
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => 1,
            };
            let _ = err.print();
            return code;
        }
    };

    setup_logging(cli.verbose);
    match execute(cli.command) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            1
        }
    }
}

fn execute(command: Commands) -> anyhow::Result<()> {
    let io = startup_io();
    match command {
        Commands::Morphology {
            input,
            operation,
            element_class,
            output,
            radius,
            compress,
            boundary,
            binary_values,
            algorithm,
            component_type,
        } => {
            let params = RawParameters {
                input,
                output,
                operation,
                element_class,
                radius,
                boundary,
                binary_values,
                algorithm,
                component_type,
                compress,
            };
            let written = morphology::run(params, &io)?;
            println!("Image saved to: {:?}", written);
        }
        Commands::CreateCylinder {
            input,
            output,
            center,
            radius,
            compress,
        } => {
            let params = CylinderParameters {
                input,
                output,
                center,
                radius,
                compress,
            };
            let written = cylinder::run(params, &io)?;
            println!("Image saved to: {:?}", written);
        }
        Commands::Info { file, json } => info::print_info(&file, json, &io)?,
    }
    Ok(())
}

/// Default formats plus the optional DICOM reader.
fn startup_io() -> ImageIo {
    let io = ImageIo::with_default_formats().register(DicomFormat);
    debug!(formats = ?io.format_names(), "image formats ready");
    io
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
