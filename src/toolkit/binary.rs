use ndarray::{Array, Dimension, Zip};
use rayon::prelude::*;

use super::element::BallElement;
use super::grid::{Grid, LaneReader};
use super::pixel::Pixel;
use super::FilterError;

/// Label that binary operations act on, and the label eroded pixels receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryValues<T> {
    pub foreground: T,
    pub background: T,
}

impl<T: Pixel> Default for BinaryValues<T> {
    /// Foreground 1, background 0.
    fn default() -> Self {
        Self {
            foreground: T::saturating_from_f64(1.0),
            background: T::saturating_from_f64(0.0),
        }
    }
}

/// Every pixel within reach of a foreground pixel becomes foreground; other pixels keep their value.
pub fn dilate<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    values: BinaryValues<T>,
) -> Result<Array<T, D>, FilterError> {
    label_filter(image, element, |readers, input_lane, out| {
        for (x, slot) in out.iter_mut().enumerate() {
            let x = x as isize;
            let reached = readers.iter().any(|(reader, half)| {
                reader
                    .clipped(x - *half as isize, x + *half as isize)
                    .iter()
                    .any(|&v| v == values.foreground)
            });
            *slot = if reached {
                values.foreground
            } else {
                input_lane[x as usize]
            };
        }
    })
}

/// A foreground pixel with any non-foreground neighbor inside the image becomes background.
///
/// Outside the image counts as foreground, so objects touching the border are not eaten from it.
pub fn erode<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    values: BinaryValues<T>,
) -> Result<Array<T, D>, FilterError> {
    label_filter(image, element, |readers, input_lane, out| {
        for (x, slot) in out.iter_mut().enumerate() {
            let value = input_lane[x];
            if value != values.foreground {
                *slot = value;
                continue;
            }
            let x = x as isize;
            let intact = readers.iter().all(|(reader, half)| {
                reader
                    .clipped(x - *half as isize, x + *half as isize)
                    .iter()
                    .all(|&v| v == values.foreground)
            });
            *slot = if intact {
                values.foreground
            } else {
                values.background
            };
        }
    })
}

pub fn open<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    values: BinaryValues<T>,
) -> Result<Array<T, D>, FilterError> {
    dilate(&erode(image, element, values)?, element, values)
}

pub fn close<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    values: BinaryValues<T>,
) -> Result<Array<T, D>, FilterError> {
    erode(&dilate(image, element, values)?, element, values)
}

/// Foreground on the band that dilation adds and erosion removes, background elsewhere.
pub fn gradient<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    values: BinaryValues<T>,
) -> Result<Array<T, D>, FilterError> {
    let dilated = dilate(image, element, values)?;
    let eroded = erode(image, element, values)?;
    Ok(Zip::from(&dilated).and(&eroded).map_collect(|&d, &e| {
        if d == values.foreground && e != values.foreground {
            values.foreground
        } else {
            values.background
        }
    }))
}

type LaneReaders<'a, T> = [(LaneReader<'a, T>, usize)];

fn label_filter<T, D, F>(
    image: &Array<T, D>,
    element: &BallElement,
    per_lane: F,
) -> Result<Array<T, D>, FilterError>
where
    T: Pixel,
    D: Dimension,
    F: Fn(&LaneReaders<'_, T>, &[T], &mut [T]) + Sync,
{
    let grid = Grid::for_element(image.shape(), element)?;
    let input: Vec<T> = image.iter().copied().collect();
    let mut output = input.clone();
    let lane_len = grid.lane_len();

    if lane_len > 0 {
        output
            .par_chunks_mut(lane_len)
            .enumerate()
            .for_each(|(lane, out)| {
                let coords = grid.lane_coords(lane);
                let readers: Vec<(LaneReader<'_, T>, usize)> = element
                    .chords()
                    .iter()
                    .map(|chord| {
                        let reader = LaneReader {
                            input: &input,
                            source: grid.chord_source(&coords, chord),
                            len: lane_len,
                            boundary: T::default(),
                        };
                        (reader, chord.half)
                    })
                    .collect();
                let start = lane * lane_len;
                per_lane(&readers, &input[start..start + lane_len], out);
            });
    }

    Ok(Array::from_shape_vec(image.raw_dim(), output)?)
}
