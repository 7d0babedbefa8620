use ndarray::{Array, Dimension, IxDyn};
use rayon::prelude::*;

use super::image::Geometry;
use super::FilterError;

/// Membership test over physical space.
pub trait SpatialFunction: Sync {
    fn evaluate(&self, point: &[f64]) -> bool;
}

/// Infinite cylinder whose axis runs along the last image axis through `center`; a disc in 2D.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderFunction {
    center: Vec<f64>,
    radius: f64,
}

impl CylinderFunction {
    pub fn new(center: Vec<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl SpatialFunction for CylinderFunction {
    fn evaluate(&self, point: &[f64]) -> bool {
        let distance_squared: f64 = point
            .iter()
            .zip(&self.center)
            .take(2)
            .map(|(p, c)| (p - c) * (p - c))
            .sum();
        distance_squared <= self.radius * self.radius
    }
}

/// Samples `function` at every pixel center of a grid of `size` (image axis order): 1 inside, 0 outside.
pub fn rasterize<D: Dimension>(
    size: &[usize],
    geometry: &Geometry,
    function: &impl SpatialFunction,
) -> Result<Array<u8, D>, FilterError> {
    let shape: Vec<usize> = size.iter().rev().copied().collect();
    let len: usize = size.iter().product();

    // Row-major over the reversed shape, so x varies fastest.
    let values: Vec<u8> = (0..len)
        .into_par_iter()
        .map(|flat| {
            let mut rest = flat;
            let continuous: Vec<f64> = size
                .iter()
                .map(|&extent| {
                    let index = rest % extent;
                    rest /= extent;
                    index as f64
                })
                .collect();
            u8::from(function.evaluate(&geometry.index_to_physical(&continuous)))
        })
        .collect();

    let mask = Array::from_shape_vec(IxDyn(&shape), values)?;
    Ok(mask.into_dimensionality::<D>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_ignores_the_axial_coordinate() {
        let cylinder = CylinderFunction::new(vec![0.0, 0.0, 0.0], 2.0);
        assert!(cylinder.evaluate(&[1.0, 1.0, 100.0]));
        assert!(cylinder.evaluate(&[2.0, 0.0, -3.0]));
        assert!(!cylinder.evaluate(&[2.0, 1.0, 0.0]));
    }

    #[test]
    fn rasterized_mask_follows_image_axis_order() {
        let geometry = Geometry::identity(2);
        let cylinder = CylinderFunction::new(vec![4.0, 1.0], 0.5);
        let mask = rasterize::<ndarray::Ix2>(&[5, 3], &geometry, &cylinder).unwrap();

        assert_eq!(mask.shape(), &[3, 5]);
        assert_eq!(mask[[1, 4]], 1);
        assert_eq!(mask.iter().filter(|&&v| v == 1).count(), 1);
    }
}
