//
// request.rs
// pxtools
//
// Parameter stages of a morphology run, from raw command-line values to the immutable filter request.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ToolError;
use crate::toolkit::Algorithm;

/// Values exactly as the command line delivered them.
#[derive(Debug, Clone, Default)]
pub struct RawParameters {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub operation: Option<String>,
    pub element_class: Option<String>,
    pub radius: Option<Vec<i64>>,
    pub boundary: Option<String>,
    pub binary_values: Option<Vec<String>>,
    pub algorithm: Option<i64>,
    pub component_type: Option<String>,
    pub compress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Erosion,
    Dilation,
    Opening,
    Closing,
    Gradient,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Erosion,
        Operation::Dilation,
        Operation::Opening,
        Operation::Closing,
        Operation::Gradient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Erosion => "erosion",
            Operation::Dilation => "dilation",
            Operation::Opening => "opening",
            Operation::Closing => "closing",
            Operation::Gradient => "gradient",
        }
    }

    /// Case-insensitive.
    pub fn parse(value: &str) -> Result<Self, ToolError> {
        let folded = value.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == folded)
            .ok_or_else(|| ToolError::InvalidOption {
                option: "op",
                value: value.to_string(),
                expected: one_of(Self::ALL.iter().map(|op| op.as_str())),
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family of structuring element, selected with `-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementClass {
    #[default]
    Grayscale,
    Binary,
    Parabolic,
}

impl ElementClass {
    pub const ALL: [ElementClass; 3] = [
        ElementClass::Grayscale,
        ElementClass::Binary,
        ElementClass::Parabolic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementClass::Grayscale => "grayscale",
            ElementClass::Binary => "binary",
            ElementClass::Parabolic => "parabolic",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ToolError> {
        let folded = value.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == folded)
            .ok_or_else(|| ToolError::InvalidOption {
                option: "type",
                value: value.to_string(),
                expected: one_of(Self::ALL.iter().map(|class| class.as_str())),
            })
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn one_of<'a>(names: impl Iterator<Item = &'a str>) -> String {
    format!("one of {{{}}}", names.collect::<Vec<_>>().join(", "))
}

/// Foreground and background labels, still unparsed; they are read as the pixel type at execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPair {
    pub foreground: String,
    pub background: String,
}

/// Options that only make sense for one element class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuringElement {
    Grayscale {
        boundary: Option<String>,
        /// Set only for the gradient.
        algorithm: Option<Algorithm>,
    },
    Binary {
        values: Option<BinaryPair>,
    },
    Parabolic,
}

impl StructuringElement {
    pub fn class(&self) -> ElementClass {
        match self {
            StructuringElement::Grayscale { .. } => ElementClass::Grayscale,
            StructuringElement::Binary { .. } => ElementClass::Binary,
            StructuringElement::Parabolic => ElementClass::Parabolic,
        }
    }
}

/// Output of the parameter validator: required options present, enum values normalized.
#[derive(Debug, Clone)]
pub struct ValidatedParameters {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub operation: Operation,
    pub element_class: ElementClass,
    pub radius: Vec<i64>,
    pub boundary: Option<String>,
    pub binary_values: Option<Vec<String>>,
    pub algorithm: Option<i64>,
    pub component_type: Option<String>,
    pub compress: bool,
}

/// What the resolver learned from the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub output: PathBuf,
    /// Display spelling, e.g. `unsigned char`.
    pub component_type: String,
    pub dimension: usize,
}

/// Fully checked description of one filter run. Built once, consumed once.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) operation: Operation,
    pub(crate) element: StructuringElement,
    pub(crate) radius: Vec<usize>,
    pub(crate) component_type: String,
    pub(crate) dimension: usize,
    pub(crate) compress: bool,
}

impl FilterRequest {
    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn element(&self) -> &StructuringElement {
        &self.element
    }

    /// One entry per image axis, each at least 1.
    pub fn radius(&self) -> &[usize] {
        &self.radius
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn compress(&self) -> bool {
        self.compress
    }
}
