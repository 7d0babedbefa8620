//
// raster.rs
// pxtools
//
// Reads and writes 2D raster formats (PNG, TIFF, BMP, PNM, read-only JPEG) through the image crate.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};
use tracing::debug;

use super::{extension_of, FormatBackend, ImageIoError, RawImage};
use crate::toolkit::{Geometry, Samples};

const FORMAT: &str = "Raster";

pub struct RasterFormat;

impl FormatBackend for RasterFormat {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn reads(&self, extension: &str) -> bool {
        matches!(
            extension,
            "png" | "tif" | "tiff" | "bmp" | "pgm" | "pnm" | "jpg" | "jpeg"
        )
    }

    fn writes(&self, extension: &str) -> bool {
        self.reads(extension) && !matches!(extension, "jpg" | "jpeg")
    }

    fn read(&self, path: &Path) -> Result<RawImage, ImageIoError> {
        let decoded = image::open(path)?;
        let size = vec![decoded.width() as usize, decoded.height() as usize];

        // Color layouts keep their channels interleaved; the tools reject them later.
        let (components, samples) = match decoded {
            DynamicImage::ImageLuma8(buffer) => (1, Samples::U8(buffer.into_raw())),
            DynamicImage::ImageLumaA8(buffer) => (2, Samples::U8(buffer.into_raw())),
            DynamicImage::ImageRgb8(buffer) => (3, Samples::U8(buffer.into_raw())),
            DynamicImage::ImageRgba8(buffer) => (4, Samples::U8(buffer.into_raw())),
            DynamicImage::ImageLuma16(buffer) => (1, Samples::U16(buffer.into_raw())),
            DynamicImage::ImageLumaA16(buffer) => (2, Samples::U16(buffer.into_raw())),
            DynamicImage::ImageRgb16(buffer) => (3, Samples::U16(buffer.into_raw())),
            DynamicImage::ImageRgba16(buffer) => (4, Samples::U16(buffer.into_raw())),
            DynamicImage::ImageRgb32F(buffer) => (3, Samples::F32(buffer.into_raw())),
            DynamicImage::ImageRgba32F(buffer) => (4, Samples::F32(buffer.into_raw())),
            other => (4, Samples::U8(other.into_rgba8().into_raw())),
        };

        Ok(RawImage {
            size,
            geometry: Geometry::identity(2),
            components,
            samples,
        })
    }

    fn write(&self, image: &RawImage, path: &Path, compress: bool) -> Result<(), ImageIoError> {
        if compress {
            debug!(?path, "raster formats ignore the compression flag");
        }
        let unsupported = || ImageIoError::UnsupportedPixel {
            format: FORMAT,
            component: image.samples.component_type().toolkit_name().to_string(),
            components: image.components,
            dimension: image.dimension(),
        };
        if image.dimension() != 2 || image.components != 1 {
            return Err(unsupported());
        }
        let extent = |axis: usize| {
            u32::try_from(image.size[axis]).map_err(|_| ImageIoError::Malformed {
                format: FORMAT,
                path: path.to_path_buf(),
                reason: format!(
                    "{} pixels along axis {} exceed the raster limit",
                    image.size[axis], axis
                ),
            })
        };
        let (width, height) = (extent(0)?, extent(1)?);
        let short_buffer = || ImageIoError::Malformed {
            format: FORMAT,
            path: path.to_path_buf(),
            reason: format!(
                "{} samples do not fill a {}x{} image",
                image.samples.len(),
                width,
                height
            ),
        };

        match &image.samples {
            Samples::U8(values) => {
                let buffer = ImageBuffer::<Luma<u8>, _>::from_raw(width, height, values.clone())
                    .ok_or_else(short_buffer)?;
                buffer.save(path)?;
            }
            Samples::U16(values) => {
                let buffer = ImageBuffer::<Luma<u16>, _>::from_raw(width, height, values.clone())
                    .ok_or_else(short_buffer)?;
                buffer.save(path)?;
            }
            _ => return Err(unsupported()),
        }
        debug!(extension = %extension_of(path), "raster image saved");
        Ok(())
    }
}
