//
// resolve.rs
// pxtools
//
// Derives output path, component type and dimension for a morphology run from the input file.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::{Path, PathBuf};

use tracing::debug;

use super::request::{ElementClass, Operation, Resolution, ValidatedParameters};
use crate::error::ToolError;
use crate::imageio::ImageIo;

/// Probes the input; the probe failing stops the run.
pub fn resolve(params: &ValidatedParameters, io: &ImageIo) -> Result<Resolution, ToolError> {
    let descriptor = io
        .probe(&params.input)
        .map_err(|source| ToolError::ImageProbe {
            path: params.input.clone(),
            source,
        })?;
    debug!(?descriptor, "probed input image");

    number_of_components_check(descriptor.component_count)?;

    let component_type = resolve_component_type(
        &descriptor.component_type,
        params.component_type.as_deref(),
    );
    let output = params.output.clone().unwrap_or_else(|| {
        default_output_path(&params.input, params.operation, params.element_class)
    });

    Ok(Resolution {
        output,
        component_type,
        dimension: descriptor.dimension,
    })
}

/// `<stem>_<operation>_<class><ext>`, relative to the working directory.
pub fn default_output_path(input: &Path, operation: Operation, class: ElementClass) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    PathBuf::from(format!("{}_{}_{}{}", stem, operation, class, extension))
}

/// The override wins over the probed name; underscores become spaces either way.
pub fn resolve_component_type(probed: &str, component_override: Option<&str>) -> String {
    component_override.unwrap_or(probed).replace('_', " ")
}

/// Only scalar images are filtered.
pub fn number_of_components_check(count: usize) -> Result<(), ToolError> {
    if count == 1 {
        Ok(())
    } else {
        Err(ToolError::UnsupportedImageKind(count))
    }
}

/// One value is replicated to every axis, `dimension` values pass through, anything else has no result.
pub fn broadcast_radius(radius: &[usize], dimension: usize) -> Option<Vec<usize>> {
    match radius {
        [single] => Some(vec![*single; dimension]),
        _ if radius.len() == dimension => Some(radius.to_vec()),
        _ => None,
    }
}
