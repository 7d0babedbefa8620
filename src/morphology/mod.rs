//
// mod.rs
// pxtools
//
// Morphology tool: validates parameters, resolves them against the input image and dispatches the typed filter.
//
// Thales Matheus Mendonça Santos - November 2025

pub mod dispatch;
pub mod execute;
pub mod request;
pub mod resolve;
pub mod validate;

use std::path::PathBuf;

use tracing::info;

use crate::error::ToolError;
use crate::imageio::ImageIo;

pub use dispatch::Dispatch;
pub use request::{
    BinaryPair, ElementClass, FilterRequest, Operation, RawParameters, StructuringElement,
};

/// Runs the full pipeline and returns the path written.
///
/// Every check completes before the input is read for filtering.
pub fn run(raw: RawParameters, io: &ImageIo) -> Result<PathBuf, ToolError> {
    let params = validate::validate_parameters(raw)?;
    let resolution = resolve::resolve(&params, io)?;
    let request = validate::cross_validate(params, resolution)?;

    info!(
        input = ?request.input(),
        operation = %request.operation(),
        class = %request.element().class(),
        component_type = request.component_type(),
        dimension = request.dimension(),
        "running morphology"
    );

    match dispatch::dispatch(&request, io)? {
        Dispatch::Completed => Ok(request.output().to_path_buf()),
        Dispatch::Unsupported => Err(ToolError::UnsupportedDimensionOrType {
            component_type: request.component_type().to_string(),
            dimension: request.dimension(),
        }),
    }
}
