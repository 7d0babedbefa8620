//
// metaimage.rs
// pxtools
//
// MetaImage reader/writer: `.mhd` header with a detached `.raw`/`.zraw` file, or `.mha` with inline data.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::{extension_of, FormatBackend, ImageIoError, RawImage};
use crate::models::ImageDescriptor;
use crate::toolkit::{ComponentType, Geometry, Samples};

const FORMAT: &str = "MetaImage";

pub struct MetaImageFormat;

/// Where the pixel bytes live.
#[derive(Debug, Clone, PartialEq)]
enum DataFile {
    Local,
    External(PathBuf),
}

#[derive(Debug, Clone)]
struct Header {
    size: Vec<usize>,
    geometry: Geometry,
    component: ComponentType,
    channels: usize,
    big_endian: bool,
    compressed: bool,
    byte_len: usize,
    data_file: DataFile,
}

impl Header {
    fn descriptor(&self) -> ImageDescriptor {
        ImageDescriptor {
            format: FORMAT.to_string(),
            component_type: self.component.toolkit_name().to_string(),
            pixel_type: ImageDescriptor::pixel_type_for(self.channels).to_string(),
            dimension: self.size.len(),
            component_count: self.channels,
            size: self.size.clone(),
            spacing: self.geometry.spacing.clone(),
            origin: self.geometry.origin.clone(),
            direction: self.geometry.direction.clone(),
        }
    }
}

impl FormatBackend for MetaImageFormat {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn reads(&self, extension: &str) -> bool {
        matches!(extension, "mhd" | "mha")
    }

    fn writes(&self, extension: &str) -> bool {
        self.reads(extension)
    }

    fn probe(&self, path: &Path) -> Result<ImageDescriptor, ImageIoError> {
        let file = File::open(path).map_err(|e| ImageIoError::io(path, e))?;
        let header = read_header(&mut BufReader::new(file), path)?;
        Ok(header.descriptor())
    }

    fn read(&self, path: &Path) -> Result<RawImage, ImageIoError> {
        let file = File::open(path).map_err(|e| ImageIoError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let header = read_header(&mut reader, path)?;

        // Inline data follows the header in the same stream.
        let mut stored = Vec::new();
        match &header.data_file {
            DataFile::Local => {
                reader
                    .read_to_end(&mut stored)
                    .map_err(|e| ImageIoError::io(path, e))?;
            }
            DataFile::External(data_path) => {
                stored = std::fs::read(data_path).map_err(|e| ImageIoError::io(data_path, e))?;
            }
        }

        let bytes = if header.compressed {
            let mut inflated = Vec::new();
            ZlibDecoder::new(stored.as_slice())
                .take(header.byte_len as u64)
                .read_to_end(&mut inflated)
                .map_err(|e| ImageIoError::io(path, e))?;
            inflated
        } else {
            stored
        };

        if bytes.len() < header.byte_len {
            return Err(malformed(
                path,
                format!(
                    "expected {} bytes of pixel data, found {}",
                    header.byte_len,
                    bytes.len()
                ),
            ));
        }

        let samples = decode_samples(
            &bytes[..header.byte_len],
            header.component,
            header.big_endian,
        );
        Ok(RawImage {
            size: header.size,
            geometry: header.geometry,
            components: header.channels,
            samples,
        })
    }

    fn write(&self, image: &RawImage, path: &Path, compress: bool) -> Result<(), ImageIoError> {
        let dimension = image.dimension();
        let payload = encode_samples(&image.samples);
        let payload = if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder
                .write_all(&payload)
                .map_err(|e| ImageIoError::io(path, e))?;
            encoder.finish().map_err(|e| ImageIoError::io(path, e))?
        } else {
            payload
        };

        let inline = extension_of(path) == "mha";
        let data_name = if inline {
            "LOCAL".to_string()
        } else {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");
            format!("{}.{}", stem, if compress { "zraw" } else { "raw" })
        };

        let mut header = String::new();
        header.push_str("ObjectType = Image\n");
        header.push_str(&format!("NDims = {}\n", dimension));
        header.push_str("BinaryData = True\n");
        header.push_str("BinaryDataByteOrderMSB = False\n");
        header.push_str(&format!(
            "CompressedData = {}\n",
            if compress { "True" } else { "False" }
        ));
        if compress {
            header.push_str(&format!("CompressedDataSize = {}\n", payload.len()));
        }
        header.push_str(&format!("TransformMatrix = {}\n", join(&image.geometry.direction)));
        header.push_str(&format!("Offset = {}\n", join(&image.geometry.origin)));
        header.push_str(&format!("ElementSpacing = {}\n", join(&image.geometry.spacing)));
        header.push_str(&format!("DimSize = {}\n", join(&image.size)));
        if image.components != 1 {
            header.push_str(&format!("ElementNumberOfChannels = {}\n", image.components));
        }
        header.push_str(&format!(
            "ElementType = {}\n",
            element_type_name(image.samples.component_type())
        ));
        header.push_str(&format!("ElementDataFile = {}\n", data_name));

        if inline {
            let mut contents = header.into_bytes();
            contents.extend_from_slice(&payload);
            std::fs::write(path, contents).map_err(|e| ImageIoError::io(path, e))?;
        } else {
            let data_path = path.with_file_name(&data_name);
            std::fs::write(&data_path, &payload).map_err(|e| ImageIoError::io(&data_path, e))?;
            std::fs::write(path, header).map_err(|e| ImageIoError::io(path, e))?;
        }
        Ok(())
    }
}

fn malformed(path: &Path, reason: impl Into<String>) -> ImageIoError {
    ImageIoError::Malformed {
        format: FORMAT,
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_type_name(component: ComponentType) -> &'static str {
    match component {
        ComponentType::UnsignedChar => "MET_UCHAR",
        ComponentType::Char => "MET_CHAR",
        ComponentType::UnsignedShort => "MET_USHORT",
        ComponentType::Short => "MET_SHORT",
        ComponentType::UnsignedInt => "MET_UINT",
        ComponentType::Int => "MET_INT",
        ComponentType::Float => "MET_FLOAT",
        ComponentType::Double => "MET_DOUBLE",
    }
}

fn element_type_from_name(name: &str) -> Option<ComponentType> {
    ComponentType::ALL
        .into_iter()
        .find(|c| element_type_name(*c).eq_ignore_ascii_case(name))
}

/// Reads `Key = Value` lines up to and including `ElementDataFile`, which always ends the header.
fn read_header<R: BufRead>(reader: &mut R, path: &Path) -> Result<Header, ImageIoError> {
    let mut ndims: Option<usize> = None;
    let mut size: Option<Vec<usize>> = None;
    let mut spacing: Option<Vec<f64>> = None;
    let mut origin: Option<Vec<f64>> = None;
    let mut direction: Option<Vec<f64>> = None;
    let mut component: Option<ComponentType> = None;
    let mut channels = 1usize;
    let mut big_endian = false;
    let mut compressed = false;

    let mut line = Vec::new();
    let data_file = loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| ImageIoError::io(path, e))?;
        if read == 0 {
            return Err(malformed(path, "header ends before ElementDataFile"));
        }
        let text = String::from_utf8_lossy(&line);
        let Some((key, value)) = text.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "ndims" => ndims = Some(parse_one(value, path, "NDims")?),
            "dimsize" => size = Some(parse_list(value, path, "DimSize")?),
            "elementspacing" | "elementsize" => {
                spacing = Some(parse_list(value, path, "ElementSpacing")?)
            }
            "offset" | "origin" | "position" => origin = Some(parse_list(value, path, "Offset")?),
            "transformmatrix" | "rotation" | "orientation" => {
                direction = Some(parse_list(value, path, "TransformMatrix")?)
            }
            "elementtype" => {
                component = Some(element_type_from_name(value).ok_or_else(|| {
                    malformed(path, format!("unsupported ElementType {}", value))
                })?)
            }
            "elementnumberofchannels" => {
                channels = parse_one(value, path, "ElementNumberOfChannels")?
            }
            "binarydatabyteordermsb" | "elementbyteordermsb" => {
                big_endian = value.eq_ignore_ascii_case("true")
            }
            "compresseddata" => compressed = value.eq_ignore_ascii_case("true"),
            "elementdatafile" => {
                if value.eq_ignore_ascii_case("local") {
                    break DataFile::Local;
                }
                if value.eq_ignore_ascii_case("list") || value.contains('%') {
                    return Err(malformed(path, "multi-file data sets are not supported"));
                }
                let parent = path.parent().unwrap_or_else(|| Path::new(""));
                break DataFile::External(parent.join(value));
            }
            _ => {}
        }
    };

    let size = size.ok_or_else(|| malformed(path, "missing DimSize"))?;
    let dimension = ndims.unwrap_or(size.len());
    if size.len() != dimension {
        return Err(malformed(
            path,
            format!("NDims = {} but DimSize has {} entries", dimension, size.len()),
        ));
    }
    let identity = Geometry::identity(dimension);
    let geometry = Geometry {
        spacing: spacing
            .filter(|s| s.len() == dimension)
            .unwrap_or(identity.spacing),
        origin: origin
            .filter(|o| o.len() == dimension)
            .unwrap_or(identity.origin),
        direction: direction
            .filter(|d| d.len() == dimension * dimension)
            .unwrap_or(identity.direction),
    };

    let component = component.ok_or_else(|| malformed(path, "missing ElementType"))?;
    let byte_len = size
        .iter()
        .copied()
        .chain([channels, component.bytes_per_sample()])
        .try_fold(1usize, |total, n| total.checked_mul(n))
        .ok_or_else(|| malformed(path, "DimSize describes more data than can be addressed"))?;

    Ok(Header {
        size,
        geometry,
        component,
        channels,
        big_endian,
        compressed,
        byte_len,
        data_file,
    })
}

fn parse_one<T: std::str::FromStr>(value: &str, path: &Path, key: &str) -> Result<T, ImageIoError> {
    value
        .parse()
        .map_err(|_| malformed(path, format!("invalid {} value {:?}", key, value)))
}

fn parse_list<T: std::str::FromStr>(
    value: &str,
    path: &Path,
    key: &str,
) -> Result<Vec<T>, ImageIoError> {
    value
        .split_whitespace()
        .map(|token| parse_one(token, path, key))
        .collect()
}

macro_rules! decode_as {
    ($bytes:expr, $ty:ty, $big_endian:expr) => {{
        const WIDTH: usize = std::mem::size_of::<$ty>();
        $bytes
            .chunks_exact(WIDTH)
            .map(|chunk| {
                let mut raw = [0u8; WIDTH];
                raw.copy_from_slice(chunk);
                if $big_endian {
                    <$ty>::from_be_bytes(raw)
                } else {
                    <$ty>::from_le_bytes(raw)
                }
            })
            .collect()
    }};
}

fn decode_samples(bytes: &[u8], component: ComponentType, big_endian: bool) -> Samples {
    match component {
        ComponentType::UnsignedChar => Samples::U8(bytes.to_vec()),
        ComponentType::Char => Samples::I8(bytes.iter().map(|&b| b as i8).collect()),
        ComponentType::UnsignedShort => Samples::U16(decode_as!(bytes, u16, big_endian)),
        ComponentType::Short => Samples::I16(decode_as!(bytes, i16, big_endian)),
        ComponentType::UnsignedInt => Samples::U32(decode_as!(bytes, u32, big_endian)),
        ComponentType::Int => Samples::I32(decode_as!(bytes, i32, big_endian)),
        ComponentType::Float => Samples::F32(decode_as!(bytes, f32, big_endian)),
        ComponentType::Double => Samples::F64(decode_as!(bytes, f64, big_endian)),
    }
}

fn encode_samples(samples: &Samples) -> Vec<u8> {
    match samples {
        Samples::U8(v) => v.clone(),
        Samples::I8(v) => v.iter().map(|&x| x as u8).collect(),
        Samples::U16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Samples::I16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Samples::U32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Samples::I32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Samples::F32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        Samples::F64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
    }
}
