//
// execute.rs
// pxtools
//
// Runs one filter request for a fixed pixel type and dimension: read, filter, write.
//
// Thales Matheus Mendonça Santos - November 2025

use ndarray::{Array, Dimension};
use tracing::{debug, info};

use super::request::{BinaryPair, FilterRequest, Operation, StructuringElement};
use crate::error::ToolError;
use crate::imageio::ImageIo;
use crate::toolkit::binary::{self, BinaryValues};
use crate::toolkit::grayscale::{self, Algorithm, Boundary};
use crate::toolkit::{parabolic, BallElement, FilterError, Pixel};

/// Options resolved to pixel values, parsed before any image is read.
enum Plan<T> {
    Grayscale {
        boundary: Boundary<T>,
        algorithm: Option<Algorithm>,
    },
    Binary(BinaryValues<T>),
    Parabolic,
}

pub fn run<T: Pixel, D: Dimension>(request: &FilterRequest, io: &ImageIo) -> Result<(), ToolError> {
    let plan = plan::<T>(request.element())?;

    let image = io.read::<T, D>(request.input())?;
    let element = BallElement::new(request.radius())?;
    debug!(
        operation = %request.operation(),
        radius = ?request.radius(),
        neighbors = element.len(),
        "running filter"
    );

    let filtered = apply(image.data(), &element, request.operation(), &plan)?;
    io.write(&image.with_data(filtered), request.output(), request.compress())?;
    info!(output = ?request.output(), "filter finished");
    Ok(())
}

fn plan<T: Pixel>(element: &StructuringElement) -> Result<Plan<T>, ToolError> {
    Ok(match element {
        StructuringElement::Grayscale {
            boundary,
            algorithm,
        } => Plan::Grayscale {
            boundary: match boundary {
                Some(value) => Boundary::uniform(parse_value("bc", value)?),
                None => Boundary::neutral(),
            },
            algorithm: *algorithm,
        },
        StructuringElement::Binary { values } => Plan::Binary(match values {
            Some(BinaryPair {
                foreground,
                background,
            }) => BinaryValues {
                foreground: parse_value("bin", foreground)?,
                background: parse_value("bin", background)?,
            },
            None => BinaryValues::default(),
        }),
        StructuringElement::Parabolic => Plan::Parabolic,
    })
}

fn parse_value<T: Pixel>(option: &'static str, value: &str) -> Result<T, ToolError> {
    value.trim().parse().map_err(|_| ToolError::InvalidOption {
        option,
        value: value.to_string(),
        expected: format!("a value of type {}", T::COMPONENT.display_name()),
    })
}

fn apply<T: Pixel, D: Dimension>(
    data: &Array<T, D>,
    element: &BallElement,
    operation: Operation,
    plan: &Plan<T>,
) -> Result<Array<T, D>, FilterError> {
    match plan {
        Plan::Grayscale {
            boundary,
            algorithm,
        } => {
            let boundary = *boundary;
            match operation {
                Operation::Erosion => {
                    grayscale::erode(data, element, boundary.erosion, Algorithm::Histogram)
                }
                Operation::Dilation => {
                    grayscale::dilate(data, element, boundary.dilation, Algorithm::Histogram)
                }
                Operation::Opening => grayscale::open(data, element, boundary, Algorithm::Histogram),
                Operation::Closing => {
                    grayscale::close(data, element, boundary, Algorithm::Histogram)
                }
                Operation::Gradient => {
                    grayscale::gradient(data, element, boundary, algorithm.unwrap_or_default())
                }
            }
        }
        Plan::Binary(values) => {
            let values = *values;
            match operation {
                Operation::Erosion => binary::erode(data, element, values),
                Operation::Dilation => binary::dilate(data, element, values),
                Operation::Opening => binary::open(data, element, values),
                Operation::Closing => binary::close(data, element, values),
                Operation::Gradient => binary::gradient(data, element, values),
            }
        }
        Plan::Parabolic => {
            let scale: Vec<f64> = element.radius().iter().map(|&r| r as f64).collect();
            match operation {
                Operation::Erosion => parabolic::erode(data, &scale),
                Operation::Dilation => parabolic::dilate(data, &scale),
                Operation::Opening => parabolic::open(data, &scale),
                Operation::Closing => parabolic::close(data, &scale),
                Operation::Gradient => parabolic::gradient(data, &scale),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn boundary_and_labels_are_parsed_as_the_pixel_type() {
        let element = StructuringElement::Grayscale {
            boundary: Some("300".to_string()),
            algorithm: None,
        };
        assert!(matches!(
            plan::<u8>(&element),
            Err(ToolError::InvalidOption { option: "bc", .. })
        ));
        assert!(plan::<u16>(&element).is_ok());

        let element = StructuringElement::Binary {
            values: Some(BinaryPair {
                foreground: "-1".to_string(),
                background: "0".to_string(),
            }),
        };
        assert!(matches!(
            plan::<u8>(&element),
            Err(ToolError::InvalidOption { option: "bin", .. })
        ));
        match plan::<i8>(&element).unwrap() {
            Plan::Binary(values) => assert_eq!(values.foreground, -1),
            _ => panic!("expected a binary plan"),
        }
    }

    #[test]
    fn grayscale_erosion_sees_the_single_dark_pixel() {
        let data = array![[9u8, 9, 9, 9], [9, 0, 9, 9], [9, 9, 9, 9]];
        let element = BallElement::new(&[1, 1]).unwrap();
        let plan = Plan::Grayscale {
            boundary: Boundary::neutral(),
            algorithm: None,
        };
        let eroded = apply(&data, &element, Operation::Erosion, &plan).unwrap();
        assert_eq!(eroded, array![[0u8, 0, 0, 9], [0, 0, 0, 9], [0, 0, 0, 9]]);
    }
}
