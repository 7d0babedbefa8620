//
// dispatch.rs
// pxtools
//
// Maps (dimension, component type) to a monomorphized executor.
//
// Thales Matheus Mendonça Santos - November 2025

use ndarray::{Ix2, Ix3};
use tracing::debug;

use super::execute;
use super::request::FilterRequest;
use crate::error::ToolError;
use crate::imageio::ImageIo;
use crate::toolkit::ComponentType;

pub type Executor = fn(&FilterRequest, &ImageIo) -> Result<(), ToolError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Completed,
    Unsupported,
}

/// Executor for the pair, `None` outside the compiled matrix. Accepts either component spelling.
pub fn lookup(dimension: usize, component_type: &str) -> Option<Executor> {
    let component = ComponentType::from_name(component_type)?;
    let executor: Executor = match (dimension, component) {
        (2, ComponentType::UnsignedChar) => execute::run::<u8, Ix2>,
        (2, ComponentType::Char) => execute::run::<i8, Ix2>,
        (2, ComponentType::UnsignedShort) => execute::run::<u16, Ix2>,
        (2, ComponentType::Short) => execute::run::<i16, Ix2>,
        (3, ComponentType::UnsignedChar) => execute::run::<u8, Ix3>,
        (3, ComponentType::Char) => execute::run::<i8, Ix3>,
        (3, ComponentType::UnsignedShort) => execute::run::<u16, Ix3>,
        (3, ComponentType::Short) => execute::run::<i16, Ix3>,
        _ => return None,
    };
    Some(executor)
}

pub fn is_supported(dimension: usize, component_type: &str) -> bool {
    lookup(dimension, component_type).is_some()
}

pub fn dispatch(request: &FilterRequest, io: &ImageIo) -> Result<Dispatch, ToolError> {
    match lookup(request.dimension(), request.component_type()) {
        Some(executor) => {
            debug!(
                dimension = request.dimension(),
                component_type = request.component_type(),
                "dispatching filter"
            );
            executor(request, io)?;
            Ok(Dispatch::Completed)
        }
        None => Ok(Dispatch::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_matrix_is_two_and_three_dimensional_small_integers() {
        for dimension in [2, 3] {
            for name in ["char", "unsigned char", "short", "unsigned_short"] {
                assert!(is_supported(dimension, name), "{name} {dimension}D");
            }
            for name in ["float", "double", "int", "unsigned int", "rgb"] {
                assert!(!is_supported(dimension, name), "{name} {dimension}D");
            }
        }
        for dimension in [0, 1, 4] {
            assert!(!is_supported(dimension, "unsigned char"));
        }
    }
}
