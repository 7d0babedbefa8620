use ndarray::{Array, Dimension};

use super::pixel::Pixel;

/// Physical placement of an image grid: per-axis spacing, origin and a row-major direction matrix.
///
/// All vectors are in image axis order (x first).
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    pub direction: Vec<f64>,
}

impl Geometry {
    pub fn identity(dimension: usize) -> Self {
        let mut direction = vec![0.0; dimension * dimension];
        for axis in 0..dimension {
            direction[axis * dimension + axis] = 1.0;
        }
        Self {
            spacing: vec![1.0; dimension],
            origin: vec![0.0; dimension],
            direction,
        }
    }

    pub fn dimension(&self) -> usize {
        self.spacing.len()
    }

    /// Maps a continuous index to a physical point: `origin + direction * (spacing ∘ index)`.
    pub fn index_to_physical(&self, index: &[f64]) -> Vec<f64> {
        let dimension = self.dimension();
        (0..dimension)
            .map(|row| {
                let rotated: f64 = (0..dimension)
                    .map(|col| {
                        self.direction[row * dimension + col]
                            * self.spacing[col]
                            * index.get(col).copied().unwrap_or_default()
                    })
                    .sum();
                self.origin[row] + rotated
            })
            .collect()
    }
}

/// Typed image with a compile-time dimension.
///
/// The array is stored in C order, so array axis `D - 1 - i` is image axis `i`.
#[derive(Debug, Clone)]
pub struct Image<T, D: Dimension> {
    data: Array<T, D>,
    geometry: Geometry,
}

impl<T: Pixel, D: Dimension> Image<T, D> {
    pub fn new(data: Array<T, D>, geometry: Geometry) -> Self {
        Self { data, geometry }
    }

    pub fn data(&self) -> &Array<T, D> {
        &self.data
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Per-axis size in image axis order.
    pub fn size(&self) -> Vec<usize> {
        self.data.shape().iter().rev().copied().collect()
    }

    /// Same geometry, new pixels.
    pub fn with_data<U: Pixel>(&self, data: Array<U, D>) -> Image<U, D> {
        Image {
            data,
            geometry: self.geometry.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_points_follow_spacing_and_origin() {
        let geometry = Geometry {
            spacing: vec![2.0, 0.5],
            origin: vec![10.0, -1.0],
            direction: vec![1.0, 0.0, 0.0, 1.0],
        };
        assert_eq!(geometry.index_to_physical(&[3.0, 4.0]), vec![16.0, 1.0]);
    }

    #[test]
    fn size_reverses_array_shape() {
        let data = Array::<u8, _>::zeros((3, 4, 5));
        let image = Image::new(data, Geometry::identity(3));
        assert_eq!(image.size(), vec![5, 4, 3]);
    }
}
