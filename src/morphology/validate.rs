//
// validate.rs
// pxtools
//
// Parameter checks: required options and enum values first, then the checks that need the image dimension.
//
// Thales Matheus Mendonça Santos - November 2025

use tracing::debug;

use super::request::{
    BinaryPair, ElementClass, FilterRequest, Operation, RawParameters, Resolution,
    StructuringElement, ValidatedParameters,
};
use super::resolve::broadcast_radius;
use crate::error::ToolError;
use crate::toolkit::Algorithm;

/// Checks presence of `-in`, `-op` and `-r` and normalizes the enum-valued options. No I/O.
pub fn validate_parameters(raw: RawParameters) -> Result<ValidatedParameters, ToolError> {
    let input = raw
        .input
        .ok_or(ToolError::MissingRequiredArgument("in"))?;
    let operation = raw
        .operation
        .ok_or(ToolError::MissingRequiredArgument("op"))?;
    let radius = raw.radius.ok_or(ToolError::MissingRequiredArgument("r"))?;

    let operation = Operation::parse(&operation)?;
    let element_class = match raw.element_class.as_deref() {
        Some(class) => ElementClass::parse(class)?,
        None => ElementClass::default(),
    };

    Ok(ValidatedParameters {
        input,
        output: raw.output,
        operation,
        element_class,
        radius,
        boundary: raw.boundary,
        binary_values: raw.binary_values,
        algorithm: raw.algorithm,
        component_type: raw.component_type,
        compress: raw.compress,
    })
}

/// Radius count and sign, then binary values, then the algorithm index; the first failure wins.
pub fn cross_validate(
    params: ValidatedParameters,
    resolution: Resolution,
) -> Result<FilterRequest, ToolError> {
    let radius = check_radius(&params.radius, resolution.dimension)?;
    let binary_values = params
        .binary_values
        .map(check_binary_values)
        .transpose()?;
    let algorithm = params.algorithm.map(check_algorithm).transpose()?;

    let element = match params.element_class {
        ElementClass::Grayscale => {
            if binary_values.is_some() {
                debug!("ignoring -bin for a grayscale element");
            }
            let algorithm = if params.operation == Operation::Gradient {
                Some(algorithm.unwrap_or_default())
            } else {
                if algorithm.is_some() {
                    debug!(operation = %params.operation, "ignoring -a outside the gradient");
                }
                None
            };
            StructuringElement::Grayscale {
                boundary: params.boundary,
                algorithm,
            }
        }
        ElementClass::Binary => {
            if params.boundary.is_some() || algorithm.is_some() {
                debug!("ignoring -bc/-a for a binary element");
            }
            StructuringElement::Binary {
                values: binary_values,
            }
        }
        ElementClass::Parabolic => {
            if params.boundary.is_some() || binary_values.is_some() || algorithm.is_some() {
                debug!("ignoring -bc/-bin/-a for a parabolic element");
            }
            StructuringElement::Parabolic
        }
    };

    Ok(FilterRequest {
        input: params.input,
        output: resolution.output,
        operation: params.operation,
        element,
        radius,
        component_type: resolution.component_type,
        dimension: resolution.dimension,
        compress: params.compress,
    })
}

/// Count must be 1 or `dimension`, checked before broadcasting; every entry at least 1.
pub fn check_radius(radius: &[i64], dimension: usize) -> Result<Vec<usize>, ToolError> {
    if radius.len() != 1 && radius.len() != dimension {
        return Err(ToolError::InvalidRadius(
            "the number of radii should be 1 or Dimension".to_string(),
        ));
    }
    let positive = radius
        .iter()
        .map(|&r| usize::try_from(r).ok().filter(|&r| r >= 1))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| {
            ToolError::InvalidRadius("no nonpositive numbers are allowed in radius".to_string())
        })?;
    broadcast_radius(&positive, dimension).ok_or_else(|| {
        ToolError::InvalidRadius("the number of radii should be 1 or Dimension".to_string())
    })
}

pub fn check_binary_values(values: Vec<String>) -> Result<BinaryPair, ToolError> {
    match <[String; 2]>::try_from(values) {
        Ok([foreground, background]) => Ok(BinaryPair {
            foreground,
            background,
        }),
        Err(values) => Err(ToolError::InvalidBinaryValues(values.len())),
    }
}

pub fn check_algorithm(index: i64) -> Result<Algorithm, ToolError> {
    Algorithm::from_index(index).ok_or(ToolError::InvalidAlgorithm(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw(op: &str) -> RawParameters {
        RawParameters {
            input: Some(PathBuf::from("scan.mhd")),
            operation: Some(op.to_string()),
            radius: Some(vec![1]),
            ..RawParameters::default()
        }
    }

    fn resolution(dimension: usize) -> Resolution {
        Resolution {
            output: PathBuf::from("out.mhd"),
            component_type: "short".to_string(),
            dimension,
        }
    }

    #[test]
    fn missing_options_are_named_in_order() {
        let err = validate_parameters(RawParameters::default()).unwrap_err();
        assert!(matches!(err, ToolError::MissingRequiredArgument("in")));

        let mut params = raw("erosion");
        params.radius = None;
        let err = validate_parameters(params).unwrap_err();
        assert!(matches!(err, ToolError::MissingRequiredArgument("r")));
    }

    #[test]
    fn class_defaults_to_grayscale() {
        let params = validate_parameters(raw("Dilation")).unwrap();
        assert_eq!(params.element_class, ElementClass::Grayscale);
        assert_eq!(params.operation, Operation::Dilation);
    }

    #[test]
    fn radius_rules_hold_for_every_dimension() {
        for dimension in 1..=4usize {
            assert_eq!(check_radius(&[2], dimension).unwrap(), vec![2; dimension]);
            let full: Vec<i64> = (1..=dimension as i64).collect();
            assert_eq!(
                check_radius(&full, dimension).unwrap(),
                (1..=dimension).collect::<Vec<_>>()
            );
            let too_many = vec![1; dimension + 1];
            assert!(matches!(
                check_radius(&too_many, dimension),
                Err(ToolError::InvalidRadius(_))
            ));
            assert!(matches!(
                check_radius(&[0], dimension),
                Err(ToolError::InvalidRadius(_))
            ));
            assert!(matches!(
                check_radius(&[-3], dimension),
                Err(ToolError::InvalidRadius(_))
            ));
        }
        assert!(matches!(
            check_radius(&[1, 2], 3),
            Err(ToolError::InvalidRadius(_))
        ));
    }

    #[test]
    fn binary_pair_needs_exactly_two_values() {
        for len in [0usize, 1, 3] {
            let values = vec!["1".to_string(); len];
            assert!(matches!(
                check_binary_values(values),
                Err(ToolError::InvalidBinaryValues(n)) if n == len
            ));
        }
        let pair = check_binary_values(vec!["255".into(), "0".into()]).unwrap();
        assert_eq!(pair.foreground, "255");
        assert_eq!(pair.background, "0");
    }

    #[test]
    fn algorithm_index_is_zero_to_three() {
        for index in -2..=6i64 {
            assert_eq!(check_algorithm(index).is_ok(), (0..=3).contains(&index));
        }
    }

    #[test]
    fn algorithm_is_kept_only_for_grayscale_gradient() {
        let mut params = validate_parameters(raw("gradient")).unwrap();
        params.algorithm = Some(2);
        let request = cross_validate(params.clone(), resolution(2)).unwrap();
        assert_eq!(
            request.element(),
            &StructuringElement::Grayscale {
                boundary: None,
                algorithm: Some(Algorithm::Anchor)
            }
        );

        params.operation = Operation::Opening;
        let request = cross_validate(params, resolution(2)).unwrap();
        assert_eq!(
            request.element(),
            &StructuringElement::Grayscale {
                boundary: None,
                algorithm: None
            }
        );
    }

    #[test]
    fn bad_radius_is_reported_before_bad_algorithm() {
        let mut params = validate_parameters(raw("gradient")).unwrap();
        params.radius = vec![1, 1];
        params.algorithm = Some(9);
        assert!(matches!(
            cross_validate(params, resolution(3)),
            Err(ToolError::InvalidRadius(_))
        ));
    }
}
