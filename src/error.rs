//
// error.rs
// pxtools
//
// Error taxonomy shared by the command-line tools.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use thiserror::Error;

use crate::imageio::ImageIoError;
use crate::toolkit::FilterError;

/// Everything that can stop a tool run. Each variant maps to exit code 1.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("\"-{0}\" is a required argument")]
    MissingRequiredArgument(&'static str),

    #[error("invalid value {value:?} for \"-{option}\": expected {expected}")]
    InvalidOption {
        option: &'static str,
        value: String,
        expected: String,
    },

    #[error("invalid radius: {0}")]
    InvalidRadius(String),

    #[error("\"-bin\" should contain two values: foreground and background (got {0})")]
    InvalidBinaryValues(usize),

    #[error("\"-a\" should have a value 0, 1, 2 or 3 (got {0})")]
    InvalidAlgorithm(i64),

    #[error("invalid center: {0}")]
    InvalidCenter(String),

    #[error("vector images are not supported ({0} components per pixel)")]
    UnsupportedImageKind(usize),

    #[error("this combination of pixel type and dimension is not supported: pixel type = {component_type}, dimension = {dimension}")]
    UnsupportedDimensionOrType {
        component_type: String,
        dimension: usize,
    },

    #[error("could not read image properties of {path:?}")]
    ImageProbe {
        path: PathBuf,
        #[source]
        source: ImageIoError,
    },

    #[error("toolkit execution failed")]
    ToolkitExecutionFailure(#[from] ToolkitError),
}

/// Failure raised by the image I/O layer or a filter while a tool executes.
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error(transparent)]
    Io(#[from] ImageIoError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl From<ImageIoError> for ToolError {
    fn from(err: ImageIoError) -> Self {
        ToolError::ToolkitExecutionFailure(err.into())
    }
}

impl From<FilterError> for ToolError {
    fn from(err: FilterError) -> Self {
        ToolError::ToolkitExecutionFailure(err.into())
    }
}
