//
// pixel.rs
// pxtools
//
// Pixel component types, the typed sample buffers that carry them, and the trait filters are generic over.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt::{Debug, Display};
use std::str::FromStr;

use num_traits::{Bounded, NumCast};

/// Numeric representation of a single pixel component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    UnsignedChar,
    Char,
    UnsignedShort,
    Short,
    UnsignedInt,
    Int,
    Float,
    Double,
}

impl ComponentType {
    pub const ALL: [ComponentType; 8] = [
        ComponentType::UnsignedChar,
        ComponentType::Char,
        ComponentType::UnsignedShort,
        ComponentType::Short,
        ComponentType::UnsignedInt,
        ComponentType::Int,
        ComponentType::Float,
        ComponentType::Double,
    ];

    /// Toolkit-style name with words joined by underscores (`unsigned_char`).
    pub fn toolkit_name(self) -> &'static str {
        match self {
            ComponentType::UnsignedChar => "unsigned_char",
            ComponentType::Char => "char",
            ComponentType::UnsignedShort => "unsigned_short",
            ComponentType::Short => "short",
            ComponentType::UnsignedInt => "unsigned_int",
            ComponentType::Int => "int",
            ComponentType::Float => "float",
            ComponentType::Double => "double",
        }
    }

    /// Name shown to users (`unsigned char`).
    pub fn display_name(self) -> String {
        self.toolkit_name().replace('_', " ")
    }

    /// Accepts both the toolkit and the display spelling, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.display_name() == wanted)
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            ComponentType::UnsignedChar | ComponentType::Char => 1,
            ComponentType::UnsignedShort | ComponentType::Short => 2,
            ComponentType::UnsignedInt | ComponentType::Int | ComponentType::Float => 4,
            ComponentType::Double => 8,
        }
    }
}

/// Decoded samples of any supported component type, stored x-fastest.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! for_each_buffer {
    ($samples:expr, $buffer:ident => $body:expr) => {
        match $samples {
            Samples::U8($buffer) => $body,
            Samples::I8($buffer) => $body,
            Samples::U16($buffer) => $body,
            Samples::I16($buffer) => $body,
            Samples::U32($buffer) => $body,
            Samples::I32($buffer) => $body,
            Samples::F32($buffer) => $body,
            Samples::F64($buffer) => $body,
        }
    };
}

impl Samples {
    pub fn component_type(&self) -> ComponentType {
        match self {
            Samples::U8(_) => ComponentType::UnsignedChar,
            Samples::I8(_) => ComponentType::Char,
            Samples::U16(_) => ComponentType::UnsignedShort,
            Samples::I16(_) => ComponentType::Short,
            Samples::U32(_) => ComponentType::UnsignedInt,
            Samples::I32(_) => ComponentType::Int,
            Samples::F32(_) => ComponentType::Float,
            Samples::F64(_) => ComponentType::Double,
        }
    }

    pub fn len(&self) -> usize {
        for_each_buffer!(self, buffer => buffer.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts every sample to `T`, saturating at the bounds of `T`.
    pub fn cast<T: Pixel>(&self) -> Vec<T> {
        for_each_buffer!(self, buffer => buffer
            .iter()
            .map(|&value| T::saturating_from_f64(value as f64))
            .collect())
    }
}

/// Scalar pixel component that the filters and the dispatch table can be instantiated with.
///
/// Only totally ordered integer types qualify; floating point inputs are read through a cast.
pub trait Pixel:
    Copy + Ord + Default + Debug + Display + FromStr + Bounded + NumCast + Send + Sync + 'static
{
    const COMPONENT: ComponentType;

    fn into_samples(data: Vec<Self>) -> Samples;

    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or_default()
    }

    /// Clamps to the representable range and truncates toward zero; NaN maps to zero.
    fn saturating_from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let low = Self::min_value().as_f64();
        let high = Self::max_value().as_f64();
        <Self as NumCast>::from(value.clamp(low, high)).unwrap_or_default()
    }
}

macro_rules! impl_pixel {
    ($ty:ty, $component:ident, $variant:ident) => {
        impl Pixel for $ty {
            const COMPONENT: ComponentType = ComponentType::$component;

            fn into_samples(data: Vec<Self>) -> Samples {
                Samples::$variant(data)
            }
        }
    };
}

impl_pixel!(u8, UnsignedChar, U8);
impl_pixel!(i8, Char, I8);
impl_pixel!(u16, UnsignedShort, U16);
impl_pixel!(i16, Short, I16);
impl_pixel!(u32, UnsignedInt, U32);
impl_pixel!(i32, Int, I32);
