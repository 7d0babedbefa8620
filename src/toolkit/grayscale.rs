//
// grayscale.rs
// pxtools
//
// Flat grayscale erosion/dilation with four interchangeable engines, plus opening, closing and gradient.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::BTreeMap;

use ndarray::{Array, Dimension, Zip};
use rayon::prelude::*;

use super::element::BallElement;
use super::grid::{Grid, LaneReader};
use super::pixel::Pixel;
use super::FilterError;

/// Strategy used to compute the neighborhood extremum. All variants give identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Direct scan of every offset in the ball.
    #[default]
    Basic,
    /// Moving histogram slid along the fastest axis.
    Histogram,
    /// Running extremum per chord that tracks the current extremum (the anchor).
    Anchor,
    /// Van Herk/Gil-Werman block prefix/suffix extrema per chord.
    Vhgw,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Basic,
        Algorithm::Histogram,
        Algorithm::Anchor,
        Algorithm::Vhgw,
    ];

    /// Command-line index: BASIC = 0, HISTO = 1, ANCHOR = 2, VHGW = 3.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which end of the order an operation keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    #[inline]
    fn pick<T: Ord>(self, a: T, b: T) -> T {
        match self {
            Extremum::Min => a.min(b),
            Extremum::Max => a.max(b),
        }
    }

    /// `a` is at least as extreme as `b`.
    #[inline]
    fn dominates<T: Ord>(self, a: T, b: T) -> bool {
        match self {
            Extremum::Min => a <= b,
            Extremum::Max => a >= b,
        }
    }
}

/// Values assumed outside the image for erosion and dilation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary<T> {
    pub erosion: T,
    pub dilation: T,
}

impl<T: Pixel> Boundary<T> {
    /// Values that never win the extremum: the maximum for erosion, the minimum for dilation.
    pub fn neutral() -> Self {
        Self {
            erosion: T::max_value(),
            dilation: T::min_value(),
        }
    }

    pub fn uniform(value: T) -> Self {
        Self {
            erosion: value,
            dilation: value,
        }
    }
}

pub fn erode<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    boundary: T,
    algorithm: Algorithm,
) -> Result<Array<T, D>, FilterError> {
    rank_filter(image, element, Extremum::Min, boundary, algorithm)
}

pub fn dilate<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    boundary: T,
    algorithm: Algorithm,
) -> Result<Array<T, D>, FilterError> {
    rank_filter(image, element, Extremum::Max, boundary, algorithm)
}

pub fn open<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    boundary: Boundary<T>,
    algorithm: Algorithm,
) -> Result<Array<T, D>, FilterError> {
    let eroded = erode(image, element, boundary.erosion, algorithm)?;
    dilate(&eroded, element, boundary.dilation, algorithm)
}

pub fn close<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    boundary: Boundary<T>,
    algorithm: Algorithm,
) -> Result<Array<T, D>, FilterError> {
    let dilated = dilate(image, element, boundary.dilation, algorithm)?;
    erode(&dilated, element, boundary.erosion, algorithm)
}

/// Dilation minus erosion, saturated to the range of `T`.
pub fn gradient<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    boundary: Boundary<T>,
    algorithm: Algorithm,
) -> Result<Array<T, D>, FilterError> {
    let dilated = dilate(image, element, boundary.dilation, algorithm)?;
    let eroded = erode(image, element, boundary.erosion, algorithm)?;
    Ok(Zip::from(&dilated)
        .and(&eroded)
        .map_collect(|&d, &e| T::saturating_from_f64(d.as_f64() - e.as_f64())))
}

/// Replaces every pixel with the extremum over the ball, reading `boundary` outside the image.
pub fn rank_filter<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    element: &BallElement,
    extremum: Extremum,
    boundary: T,
    algorithm: Algorithm,
) -> Result<Array<T, D>, FilterError> {
    let grid = Grid::for_element(image.shape(), element)?;
    let input: Vec<T> = image.iter().copied().collect();
    let mut output = vec![boundary; input.len()];
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
                            boundary,
                        };
                        (reader, chord.half)
                    })
                    .collect();
                match algorithm {
                    Algorithm::Basic => basic_lane(&readers, extremum, out),
                    Algorithm::Histogram => histogram_lane(&readers, extremum, out),
                    Algorithm::Anchor => chord_lane(&readers, extremum, out, anchor_running),
                    Algorithm::Vhgw => chord_lane(&readers, extremum, out, vhgw_running),
                }
            });
    }

    Ok(Array::from_shape_vec(image.raw_dim(), output)?)
}

fn basic_lane<T: Pixel>(readers: &[(LaneReader<'_, T>, usize)], extremum: Extremum, out: &mut [T]) {
    for (x, slot) in out.iter_mut().enumerate() {
        let x = x as isize;
        let mut acc = readers[0].0.get(x);
        for (reader, half) in readers {
            let half = *half as isize;
            for d in -half..=half {
                acc = extremum.pick(acc, reader.get(x + d));
            }
        }
        *slot = acc;
    }
}

fn histogram_lane<T: Pixel>(
    readers: &[(LaneReader<'_, T>, usize)],
    extremum: Extremum,
    out: &mut [T],
) {
    let mut histogram: BTreeMap<T, usize> = BTreeMap::new();
    for (reader, half) in readers {
        let half = *half as isize;
        for d in -half..=half {
            *histogram.entry(reader.get(d)).or_insert(0) += 1;
        }
    }

    for x in 0..out.len() {
        if x > 0 {
            let x = x as isize;
            for (reader, half) in readers {
                let half = *half as isize;
                let leaving = reader.get(x - 1 - half);
                if let Some(count) = histogram.get_mut(&leaving) {
                    *count -= 1;
                    if *count == 0 {
                        histogram.remove(&leaving);
                    }
                }
                *histogram.entry(reader.get(x + half)).or_insert(0) += 1;
            }
        }
        let extreme = match extremum {
            Extremum::Min => histogram.keys().next(),
            Extremum::Max => histogram.keys().next_back(),
        };
        if let Some(&value) = extreme {
            out[x] = value;
        }
    }
}

type RunningExtremum<T> = fn(&[T], usize, Extremum, &mut [T]);

/// Runs a 1D running extremum over each chord's padded lane and folds the results.
fn chord_lane<T: Pixel>(
    readers: &[(LaneReader<'_, T>, usize)],
    extremum: Extremum,
    out: &mut [T],
    running: RunningExtremum<T>,
) {
    let len = out.len();
    let mut scratch = vec![T::default(); len];
    for (index, (reader, half)) in readers.iter().enumerate() {
        let window = 2 * half + 1;
        let half = *half as isize;
        let padded: Vec<T> = (-half..len as isize + half).map(|p| reader.get(p)).collect();
        running(&padded, window, extremum, &mut scratch);
        if index == 0 {
            out.copy_from_slice(&scratch);
        } else {
            for (slot, &value) in out.iter_mut().zip(&scratch) {
                *slot = extremum.pick(*slot, value);
            }
        }
    }
}

/// `out[x]` = extremum of `padded[x..x + window]`, with block prefix and suffix extrema.
fn vhgw_running<T: Pixel>(padded: &[T], window: usize, extremum: Extremum, out: &mut [T]) {
    let len = padded.len();
    if len == 0 {
        return;
    }
    let mut prefix = padded.to_vec();
    let mut suffix = padded.to_vec();
    for i in 1..len {
        if i % window != 0 {
            prefix[i] = extremum.pick(prefix[i - 1], padded[i]);
        }
    }
    for i in (0..len - 1).rev() {
        if (i + 1) % window != 0 {
            suffix[i] = extremum.pick(suffix[i + 1], padded[i]);
        }
    }
    for (x, slot) in out.iter_mut().enumerate() {
        *slot = extremum.pick(suffix[x], prefix[x + window - 1]);
    }
}

/// Keeps the position of the current extremum and only rescans the window once it leaves.
fn anchor_running<T: Pixel>(padded: &[T], window: usize, extremum: Extremum, out: &mut [T]) {
    if out.is_empty() {
        return;
    }
    let rescan = |from: usize, to: usize| {
        let mut best = from;
        for i in from + 1..=to {
            if extremum.dominates(padded[i], padded[best]) {
                best = i;
            }
        }
        best
    };

    let mut anchor = rescan(0, window - 1);
    out[0] = padded[anchor];
    for x in 1..out.len() {
        let incoming = x + window - 1;
        if extremum.dominates(padded[incoming], padded[anchor]) {
            anchor = incoming;
        } else if anchor < x {
            anchor = rescan(x, incoming);
        }
        out[x] = padded[anchor];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_extrema_agree_with_direct_windows() {
        let padded = [5u8, 1, 7, 3, 3, 9, 0, 4, 6, 2, 8];
        let window = 3;
        let expected: Vec<u8> = padded
            .windows(window)
            .map(|w| *w.iter().max().unwrap())
            .collect();

        let mut vhgw = vec![0u8; expected.len()];
        vhgw_running(&padded, window, Extremum::Max, &mut vhgw);
        assert_eq!(vhgw, expected);

        let mut anchor = vec![0u8; expected.len()];
        anchor_running(&padded, window, Extremum::Max, &mut anchor);
        assert_eq!(anchor, expected);
    }

    #[test]
    fn algorithm_indices_cover_zero_to_three() {
        assert_eq!(Algorithm::from_index(0), Some(Algorithm::Basic));
        assert_eq!(Algorithm::from_index(3), Some(Algorithm::Vhgw));
        assert_eq!(Algorithm::from_index(4), None);
        assert_eq!(Algorithm::from_index(-1), None);
    }
}
