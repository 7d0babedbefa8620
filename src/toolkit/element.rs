//
// element.rs
// pxtools
//
// Flat ball structuring element, stored as chords along the fastest array axis.
//
// Thales Matheus Mendonça Santos - November 2025

use super::FilterError;

/// One run of the ball along the last array axis: every offset `outer ++ [d]` with `|d| <= half`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    /// Offsets on array axes `0..ndim-1`.
    pub outer: Vec<isize>,
    pub half: usize,
}

/// Ellipsoidal neighborhood with semi-axes `radius + 0.5`.
///
/// An offset `o` belongs to the ball when `Σ (oᵢ / (rᵢ + 0.5))² <= 1`, which makes a radius of 1
/// the full 3x3 square in 2D and the 19-neighborhood in 3D.
#[derive(Debug, Clone)]
pub struct BallElement {
    radius: Vec<usize>,
    chords: Vec<Chord>,
}

impl BallElement {
    /// `radius` is given in image axis order (x first).
    pub fn new(radius: &[usize]) -> Result<Self, FilterError> {
        if radius.is_empty() {
            return Err(FilterError::ElementDimension {
                radius: 0,
                dimension: 0,
            });
        }
        if radius.iter().any(|&r| r == 0) {
            return Err(FilterError::ZeroRadius);
        }

        // Array axis order: the last array axis is image axis 0.
        let array_radius: Vec<usize> = radius.iter().rev().copied().collect();
        let (outer_radius, _) = array_radius.split_at(array_radius.len() - 1);
        let last_radius = radius[0];
        let last_axis = last_radius as f64 + 0.5;

        let mut chords = Vec::new();
        for outer in box_offsets(outer_radius) {
            let used: f64 = outer
                .iter()
                .zip(outer_radius)
                .map(|(&o, &r)| (o as f64 / (r as f64 + 0.5)).powi(2))
                .sum();
            if used > 1.0 {
                continue;
            }
            let mut half = last_radius;
            while half > 0 && used + (half as f64 / last_axis).powi(2) > 1.0 {
                half -= 1;
            }
            chords.push(Chord { outer, half });
        }

        Ok(Self {
            radius: radius.to_vec(),
            chords,
        })
    }

    pub fn radius(&self) -> &[usize] {
        &self.radius
    }

    pub fn dimension(&self) -> usize {
        self.radius.len()
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// Number of offsets in the ball.
    pub fn len(&self) -> usize {
        self.chords.iter().map(|c| 2 * c.half + 1).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Every offset in array axis order.
    pub fn offsets(&self) -> Vec<Vec<isize>> {
        let mut offsets = Vec::with_capacity(self.len());
        for chord in &self.chords {
            let half = chord.half as isize;
            for d in -half..=half {
                let mut offset = chord.outer.clone();
                offset.push(d);
                offsets.push(offset);
            }
        }
        offsets
    }
}

/// All integer offsets of the box `[-r, r]` per axis, odometer order. An empty radius yields the single empty offset.
fn box_offsets(radius: &[usize]) -> Vec<Vec<isize>> {
    let mut offsets = vec![Vec::with_capacity(radius.len())];
    for &r in radius {
        let r = r as isize;
        offsets = offsets
            .into_iter()
            .flat_map(|prefix| {
                (-r..=r).map(move |d| {
                    let mut next = prefix.clone();
                    next.push(d);
                    next
                })
            })
            .collect();
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ball_sizes_match_neighborhoods() {
        assert_eq!(BallElement::new(&[1, 1]).unwrap().len(), 9);
        assert_eq!(BallElement::new(&[1, 1, 1]).unwrap().len(), 19);
    }

    #[test]
    fn anisotropic_ball_uses_image_axis_order() {
        // Radius 3 along x (last array axis), 1 along y.
        let ball = BallElement::new(&[3, 1]).unwrap();
        let widest = ball.chords().iter().map(|c| c.half).max().unwrap();
        assert_eq!(widest, 3);
        assert!(ball.chords().iter().all(|c| c.outer[0].abs() <= 1));
    }

    #[test]
    fn zero_radius_is_rejected() {
        assert!(matches!(
            BallElement::new(&[2, 0]),
            Err(FilterError::ZeroRadius)
        ));
    }
}
