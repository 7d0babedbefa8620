use super::element::{BallElement, Chord};
use super::FilterError;

/// Flat C-order index arithmetic for lanes along the last array axis.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl Grid {
    pub(crate) fn new(shape: &[usize]) -> Self {
        let mut strides = vec![1; shape.len()];
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        Self {
            shape: shape.to_vec(),
            strides,
        }
    }

    /// Fails when the element was built for another dimensionality.
    pub(crate) fn for_element(shape: &[usize], element: &BallElement) -> Result<Self, FilterError> {
        if element.dimension() != shape.len() {
            return Err(FilterError::ElementDimension {
                radius: element.dimension(),
                dimension: shape.len(),
            });
        }
        Ok(Self::new(shape))
    }

    pub(crate) fn lane_len(&self) -> usize {
        self.shape.last().copied().unwrap_or(1)
    }

    /// Coordinates of a lane on the outer axes.
    pub(crate) fn lane_coords(&self, lane: usize) -> Vec<usize> {
        let outer = &self.shape[..self.shape.len().saturating_sub(1)];
        let mut coords = vec![0; outer.len()];
        let mut rest = lane;
        for axis in (0..outer.len()).rev() {
            coords[axis] = rest % outer[axis];
            rest /= outer[axis];
        }
        coords
    }

    /// Flat start of the lane reached from `coords` by a chord, or `None` when it lies outside the image.
    pub(crate) fn chord_source(&self, coords: &[usize], chord: &Chord) -> Option<usize> {
        let mut start = 0;
        for (axis, (&c, &d)) in coords.iter().zip(&chord.outer).enumerate() {
            let shifted = c as isize + d;
            if shifted < 0 || shifted >= self.shape[axis] as isize {
                return None;
            }
            start += shifted as usize * self.strides[axis];
        }
        Some(start)
    }
}

/// A lane of the input seen through a chord: positions outside the image read as `boundary`.
pub(crate) struct LaneReader<'a, T> {
    pub(crate) input: &'a [T],
    pub(crate) source: Option<usize>,
    pub(crate) len: usize,
    pub(crate) boundary: T,
}

impl<T: Copy> LaneReader<'_, T> {
    #[inline]
    pub(crate) fn get(&self, position: isize) -> T {
        match self.source {
            Some(start) if position >= 0 && (position as usize) < self.len => {
                self.input[start + position as usize]
            }
            _ => self.boundary,
        }
    }

    /// In-image values only, clipped to `[from, to]`.
    pub(crate) fn clipped(&self, from: isize, to: isize) -> &[T] {
        match self.source {
            Some(start) => {
                let from = from.max(0) as usize;
                let to = to.min(self.len as isize - 1);
                if to < from as isize {
                    return &[];
                }
                &self.input[start + from..=start + to as usize]
            }
            None => &[],
        }
    }
}
