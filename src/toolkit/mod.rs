//
// mod.rs
// pxtools
//
// Image-processing toolkit used by the command-line tools: typed N-d images, structuring elements and filters.
//
// Thales Matheus Mendonça Santos - November 2025

pub mod binary;
pub mod element;
pub mod grayscale;
mod grid;
pub mod image;
pub mod parabolic;
pub mod pixel;
pub mod spatial;

use thiserror::Error;

pub use element::BallElement;
pub use grayscale::{Algorithm, Boundary};
pub use image::{Geometry, Image};
pub use pixel::{ComponentType, Pixel, Samples};

/// Failures raised while building or running a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("structuring element has {radius} radii but the image is {dimension}D")]
    ElementDimension { radius: usize, dimension: usize },

    #[error("structuring element radius must be at least 1")]
    ZeroRadius,

    #[error("parabolic scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("invalid image shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
