//
// dicom.rs
// pxtools
//
// Read-only DICOM backend: probes the image attributes and decodes single or multi-frame pixel data.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use ::dicom::core::Tag;
use ::dicom::object::{open_file, DefaultDicomObject};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, PixelRepresentation};

use super::{FormatBackend, ImageIoError, RawImage};
use crate::models::ImageDescriptor;
use crate::toolkit::{ComponentType, Geometry, Samples};

const FORMAT: &str = "DICOM";

const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
const ROWS: Tag = Tag(0x0028, 0x0010);
const COLUMNS: Tag = Tag(0x0028, 0x0011);
const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);

pub struct DicomFormat;

/// Typed attribute lookups on a parsed data set.
trait AttributeAccess {
    fn number(&self, tag: Tag) -> Option<u32>;
    fn numbers(&self, tag: Tag) -> Option<Vec<f64>>;
}

impl AttributeAccess for DefaultDicomObject {
    fn number(&self, tag: Tag) -> Option<u32> {
        self.element(tag).ok().and_then(|e| e.to_int::<u32>().ok())
    }

    fn numbers(&self, tag: Tag) -> Option<Vec<f64>> {
        self.element(tag)
            .ok()
            .and_then(|e| e.to_multi_float64().ok())
    }
}

/// Image layout as declared by the data set.
struct Layout {
    size: Vec<usize>,
    geometry: Geometry,
    components: usize,
    component: ComponentType,
}

impl Layout {
    fn from_object(obj: &DefaultDicomObject, path: &Path) -> Result<Self, ImageIoError> {
        let missing = |name: &str| ImageIoError::Dicom {
            path: path.to_path_buf(),
            reason: format!("missing {}", name),
        };
        let rows = obj.number(ROWS).ok_or_else(|| missing("Rows"))? as usize;
        let columns = obj.number(COLUMNS).ok_or_else(|| missing("Columns"))? as usize;
        let frames = obj.number(NUMBER_OF_FRAMES).unwrap_or(1).max(1) as usize;
        let components = obj.number(SAMPLES_PER_PIXEL).unwrap_or(1) as usize;
        let bits = obj.number(BITS_ALLOCATED).unwrap_or(8);
        let signed = obj.number(PIXEL_REPRESENTATION).unwrap_or(0) == 1;

        let component = match (bits, signed) {
            (8, false) => ComponentType::UnsignedChar,
            (8, true) => ComponentType::Char,
            (16, false) => ComponentType::UnsignedShort,
            (16, true) => ComponentType::Short,
            (32, false) => ComponentType::UnsignedInt,
            (32, true) => ComponentType::Int,
            _ => {
                return Err(ImageIoError::Dicom {
                    path: path.to_path_buf(),
                    reason: format!("unsupported BitsAllocated {}", bits),
                })
            }
        };

        let size = if frames > 1 {
            vec![columns, rows, frames]
        } else {
            vec![columns, rows]
        };
        let dimension = size.len();

        let mut geometry = Geometry::identity(dimension);
        // PixelSpacing is stored row spacing first.
        if let Some([row, column]) = obj.numbers(PIXEL_SPACING).as_deref() {
            geometry.spacing[0] = *column;
            geometry.spacing[1] = *row;
        }
        if dimension == 3 {
            if let Some(slice) = obj
                .numbers(SPACING_BETWEEN_SLICES)
                .or_else(|| obj.numbers(SLICE_THICKNESS))
                .and_then(|v| v.first().copied())
            {
                geometry.spacing[2] = slice;
            }
        }
        if let Some(position) = obj.numbers(IMAGE_POSITION_PATIENT) {
            for (origin, value) in geometry.origin.iter_mut().zip(position) {
                *origin = value;
            }
        }

        Ok(Self {
            size,
            geometry,
            components,
            component,
        })
    }
}

fn open(path: &Path) -> Result<DefaultDicomObject, ImageIoError> {
    open_file(path).map_err(|e| ImageIoError::Dicom {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

impl FormatBackend for DicomFormat {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn reads(&self, extension: &str) -> bool {
        matches!(extension, "dcm" | "dicom")
    }

    fn writes(&self, _extension: &str) -> bool {
        false
    }

    fn probe(&self, path: &Path) -> Result<ImageDescriptor, ImageIoError> {
        let obj = open(path)?;
        let layout = Layout::from_object(&obj, path)?;
        Ok(ImageDescriptor {
            format: FORMAT.to_string(),
            component_type: layout.component.toolkit_name().to_string(),
            pixel_type: ImageDescriptor::pixel_type_for(layout.components).to_string(),
            dimension: layout.size.len(),
            component_count: layout.components,
            size: layout.size,
            spacing: layout.geometry.spacing,
            origin: layout.geometry.origin,
            direction: layout.geometry.direction,
        })
    }

    fn read(&self, path: &Path) -> Result<RawImage, ImageIoError> {
        let obj = open(path)?;
        let layout = Layout::from_object(&obj, path)?;
        let decode_error = |e: dicom_pixeldata::Error| ImageIoError::Dicom {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let decoded = obj.decode_pixel_data().map_err(decode_error)?;

        // Stored values only; rescale and windowing are left to the caller.
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let signed = decoded.pixel_representation() == PixelRepresentation::Signed;
        let samples = match (layout.component.bytes_per_sample(), signed) {
            (1, false) => Samples::U8(decoded.to_vec_with_options(&options).map_err(decode_error)?),
            (1, true) => Samples::I8(decoded.to_vec_with_options(&options).map_err(decode_error)?),
            (2, false) => Samples::U16(decoded.to_vec_with_options(&options).map_err(decode_error)?),
            (2, true) => Samples::I16(decoded.to_vec_with_options(&options).map_err(decode_error)?),
            (_, false) => Samples::U32(decoded.to_vec_with_options(&options).map_err(decode_error)?),
            (_, true) => Samples::I32(decoded.to_vec_with_options(&options).map_err(decode_error)?),
        };

        Ok(RawImage {
            size: layout.size,
            geometry: layout.geometry,
            components: layout.components,
            samples,
        })
    }

    fn write(&self, _image: &RawImage, path: &Path, _compress: bool) -> Result<(), ImageIoError> {
        Err(ImageIoError::NoWriter(path.to_path_buf()))
    }
}
