//
// mod.rs
// pxtools
//
// Format registry that probes, decodes and encodes images; codecs are registered explicitly at startup.
//
// Thales Matheus Mendonça Santos - November 2025

pub mod dicom;
pub mod metaimage;
pub mod raster;

use std::path::{Path, PathBuf};

use ndarray::{Array, Dimension, IxDyn};
use thiserror::Error;
use tracing::debug;

use crate::models::ImageDescriptor;
use crate::toolkit::{Geometry, Image, Pixel, Samples};

pub use self::dicom::DicomFormat;
pub use self::metaimage::MetaImageFormat;
pub use self::raster::RasterFormat;

#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("no registered image format can read {0:?}")]
    NoReader(PathBuf),

    #[error("no registered image format can write {0:?}")]
    NoWriter(PathBuf),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {format} file {path:?}: {reason}")]
    Malformed {
        format: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("{format} cannot store {component} pixels with {components} component(s) in {dimension}D")]
    UnsupportedPixel {
        format: &'static str,
        component: String,
        components: usize,
        dimension: usize,
    },

    #[error("expected a {expected}D image, found {actual}D")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("expected a scalar image, found {0} components per pixel")]
    MultiComponent(usize),

    #[error("invalid image shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("DICOM error on {path:?}: {reason}")]
    Dicom { path: PathBuf, reason: String },
}

impl ImageIoError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ImageIoError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Decoded image independent of pixel type and dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    /// Size per axis, x first.
    pub size: Vec<usize>,
    pub geometry: Geometry,
    pub components: usize,
    /// Interleaved components, x fastest.
    pub samples: Samples,
}

impl RawImage {
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    pub fn descriptor(&self, format: &str) -> ImageDescriptor {
        ImageDescriptor {
            format: format.to_string(),
            component_type: self.samples.component_type().toolkit_name().to_string(),
            pixel_type: ImageDescriptor::pixel_type_for(self.components).to_string(),
            dimension: self.dimension(),
            component_count: self.components,
            size: self.size.clone(),
            spacing: self.geometry.spacing.clone(),
            origin: self.geometry.origin.clone(),
            direction: self.geometry.direction.clone(),
        }
    }

    /// Casts the samples to `T` (saturating) and checks the dimension against `D`.
    pub fn into_image<T: Pixel, D: Dimension>(self) -> Result<Image<T, D>, ImageIoError> {
        if self.components != 1 {
            return Err(ImageIoError::MultiComponent(self.components));
        }
        if let Some(expected) = D::NDIM {
            if expected != self.dimension() {
                return Err(ImageIoError::DimensionMismatch {
                    expected,
                    actual: self.dimension(),
                });
            }
        }
        let shape: Vec<usize> = self.size.iter().rev().copied().collect();
        let data = Array::from_shape_vec(IxDyn(&shape), self.samples.cast::<T>())?
            .into_dimensionality::<D>()?;
        Ok(Image::new(data, self.geometry))
    }

    pub fn from_image<T: Pixel, D: Dimension>(image: &Image<T, D>) -> Self {
        Self {
            size: image.size(),
            geometry: image.geometry().clone(),
            components: 1,
            samples: T::into_samples(image.data().iter().copied().collect()),
        }
    }
}

/// One codec. Backends are selected by file extension.
pub trait FormatBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn reads(&self, extension: &str) -> bool;

    fn writes(&self, extension: &str) -> bool;

    /// Reports image properties, without decoding pixels where the format allows.
    fn probe(&self, path: &Path) -> Result<ImageDescriptor, ImageIoError> {
        Ok(self.read(path)?.descriptor(self.name()))
    }

    fn read(&self, path: &Path) -> Result<RawImage, ImageIoError>;

    fn write(&self, image: &RawImage, path: &Path, compress: bool) -> Result<(), ImageIoError>;
}

/// Registry of format backends, passed explicitly to every tool.
#[derive(Default)]
pub struct ImageIo {
    formats: Vec<Box<dyn FormatBackend>>,
}

impl ImageIo {
    /// Empty registry; nothing can be read until formats are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// MetaImage and the 2D raster formats.
    pub fn with_default_formats() -> Self {
        Self::new().register(MetaImageFormat).register(RasterFormat)
    }

    pub fn register<F: FormatBackend + 'static>(mut self, format: F) -> Self {
        debug!(format = format.name(), "registered image format");
        self.formats.push(Box::new(format));
        self
    }

    pub fn format_names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.name()).collect()
    }

    fn reader_for(&self, path: &Path) -> Result<&dyn FormatBackend, ImageIoError> {
        let extension = extension_of(path);
        self.formats
            .iter()
            .find(|f| f.reads(&extension))
            .map(|f| f.as_ref())
            .ok_or_else(|| ImageIoError::NoReader(path.to_path_buf()))
    }

    fn writer_for(&self, path: &Path) -> Result<&dyn FormatBackend, ImageIoError> {
        let extension = extension_of(path);
        self.formats
            .iter()
            .find(|f| f.writes(&extension))
            .map(|f| f.as_ref())
            .ok_or_else(|| ImageIoError::NoWriter(path.to_path_buf()))
    }

    pub fn probe(&self, path: &Path) -> Result<ImageDescriptor, ImageIoError> {
        self.reader_for(path)?.probe(path)
    }

    pub fn read_raw(&self, path: &Path) -> Result<RawImage, ImageIoError> {
        self.reader_for(path)?.read(path)
    }

    pub fn write_raw(&self, image: &RawImage, path: &Path, compress: bool) -> Result<(), ImageIoError> {
        let format = self.writer_for(path)?;
        debug!(format = format.name(), ?path, compress, "writing image");
        format.write(image, path, compress)
    }

    pub fn read<T: Pixel, D: Dimension>(&self, path: &Path) -> Result<Image<T, D>, ImageIoError> {
        self.read_raw(path)?.into_image()
    }

    pub fn write<T: Pixel, D: Dimension>(
        &self,
        image: &Image<T, D>,
        path: &Path,
        compress: bool,
    ) -> Result<(), ImageIoError> {
        self.write_raw(&RawImage::from_image(image), path, compress)
    }
}

/// Lower-cased last extension, empty when there is none.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}
