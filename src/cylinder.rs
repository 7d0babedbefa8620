//
// cylinder.rs
// pxtools
//
// Stamps a cylinder mask (a disc in 2D) onto the grid of a reference image.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::{Path, PathBuf};

use ndarray::{Dimension, Ix2, Ix3};
use tracing::{debug, info};

use crate::error::ToolError;
use crate::imageio::ImageIo;
use crate::toolkit::spatial::{rasterize, CylinderFunction};
use crate::toolkit::{Geometry, Image};

#[derive(Debug, Clone, Default)]
pub struct CylinderParameters {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Center as an index into the reference image.
    pub center: Option<Vec<i64>>,
    /// Radius in physical units.
    pub radius: Option<f64>,
    pub compress: bool,
}

/// Writes an unsigned char image holding 1 inside the cylinder and 0 elsewhere.
pub fn run(params: CylinderParameters, io: &ImageIo) -> Result<PathBuf, ToolError> {
    let input = params
        .input
        .ok_or(ToolError::MissingRequiredArgument("in"))?;
    let output = params
        .output
        .ok_or(ToolError::MissingRequiredArgument("out"))?;
    let center = params
        .center
        .ok_or(ToolError::MissingRequiredArgument("c"))?;
    let radius = params
        .radius
        .ok_or(ToolError::MissingRequiredArgument("r"))?;

    let descriptor = io.probe(&input).map_err(|source| ToolError::ImageProbe {
        path: input.clone(),
        source,
    })?;
    let dimension = descriptor.dimension;
    if !matches!(dimension, 2 | 3) {
        return Err(ToolError::UnsupportedDimensionOrType {
            component_type: descriptor.component_type.replace('_', " "),
            dimension,
        });
    }

    let center = check_center(&center, dimension)?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ToolError::InvalidRadius(format!(
            "the cylinder radius must be positive, got {}",
            radius
        )));
    }

    let geometry = descriptor.geometry();
    let physical_center = geometry.index_to_physical(&center);
    debug!(?physical_center, radius, "cylinder center in physical space");
    let cylinder = CylinderFunction::new(physical_center, radius);

    let size = descriptor.size;
    match dimension {
        2 => write_mask::<Ix2>(&size, geometry, &cylinder, &output, params.compress, io)?,
        _ => write_mask::<Ix3>(&size, geometry, &cylinder, &output, params.compress, io)?,
    }
    info!(output = ?output, "cylinder written");
    Ok(output)
}

fn write_mask<D: Dimension>(
    size: &[usize],
    geometry: Geometry,
    cylinder: &CylinderFunction,
    output: &Path,
    compress: bool,
    io: &ImageIo,
) -> Result<(), ToolError> {
    let mask = rasterize::<D>(size, &geometry, cylinder)?;
    io.write(&Image::new(mask, geometry), output, compress)?;
    Ok(())
}

/// One non-negative index per axis.
fn check_center(center: &[i64], dimension: usize) -> Result<Vec<f64>, ToolError> {
    if center.len() != dimension {
        return Err(ToolError::InvalidCenter(format!(
            "expected {} values, got {}",
            dimension,
            center.len()
        )));
    }
    if let Some(negative) = center.iter().find(|&&c| c < 0) {
        return Err(ToolError::InvalidCenter(format!(
            "index {} lies outside the image",
            negative
        )));
    }
    Ok(center.iter().map(|&c| c as f64).collect())
}
