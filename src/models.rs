//
// models.rs
// pxtools
//
// Defines serializable data structures shared by the probe, the info verb and the dispatch layer.
//
// Thales Matheus Mendonça Santos - November 2025

use serde::{Deserialize, Serialize};

use crate::toolkit::Geometry;

/// What the image property probe reports about a file, before any pixel is decoded when the format allows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Name of the format backend that recognized the file.
    pub format: String,
    /// Toolkit-style component name such as `unsigned_char` or `short`.
    pub component_type: String,
    /// `scalar` for single-component pixels, `vector` otherwise.
    pub pixel_type: String,
    pub dimension: usize,
    pub component_count: usize,
    /// Size per axis, x first.
    pub size: Vec<usize>,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    /// Row-major direction cosines.
    pub direction: Vec<f64>,
}

impl ImageDescriptor {
    pub fn pixel_type_for(component_count: usize) -> &'static str {
        if component_count == 1 {
            "scalar"
        } else {
            "vector"
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            spacing: self.spacing.clone(),
            origin: self.origin.clone(),
            direction: self.direction.clone(),
        }
    }
}
