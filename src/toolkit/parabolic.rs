//
// parabolic.rs
// pxtools
//
// Separable parabolic morphology; cost per pixel does not depend on the scale.
//
// Thales Matheus Mendonça Santos - November 2025

use ndarray::{Array, Axis, Dimension, Zip};

use super::pixel::Pixel;
use super::FilterError;

/// Erosion with the structuring function `(x - y)² / (2 s)` per axis, where `scale` holds `s` in image axis order.
pub fn erode<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    scale: &[f64],
) -> Result<Array<T, D>, FilterError> {
    envelope_filter(image, scale, false)
}

pub fn dilate<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    scale: &[f64],
) -> Result<Array<T, D>, FilterError> {
    envelope_filter(image, scale, true)
}

pub fn open<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    scale: &[f64],
) -> Result<Array<T, D>, FilterError> {
    dilate(&erode(image, scale)?, scale)
}

pub fn close<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    scale: &[f64],
) -> Result<Array<T, D>, FilterError> {
    erode(&dilate(image, scale)?, scale)
}

pub fn gradient<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    scale: &[f64],
) -> Result<Array<T, D>, FilterError> {
    let dilated = dilate(image, scale)?;
    let eroded = erode(image, scale)?;
    Ok(Zip::from(&dilated)
        .and(&eroded)
        .map_collect(|&d, &e| T::saturating_from_f64(d.as_f64() - e.as_f64())))
}

fn envelope_filter<T: Pixel, D: Dimension>(
    image: &Array<T, D>,
    scale: &[f64],
    dilation: bool,
) -> Result<Array<T, D>, FilterError> {
    if scale.len() != image.ndim() {
        return Err(FilterError::ElementDimension {
            radius: scale.len(),
            dimension: image.ndim(),
        });
    }
    if let Some(&bad) = scale.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
        return Err(FilterError::InvalidScale(bad));
    }

    // Dilation is the negated erosion of the negated image.
    let sign = if dilation { -1.0 } else { 1.0 };
    let mut work = image.mapv(|v| sign * v.as_f64());

    for (image_axis, &s) in scale.iter().enumerate() {
        let axis = Axis(image.ndim() - 1 - image_axis);
        let coefficient = 1.0 / (2.0 * s);
        Zip::from(work.lanes_mut(axis)).par_for_each(|mut lane| {
            let values: Vec<f64> = lane.iter().copied().collect();
            let mut eroded = vec![0.0; values.len()];
            lower_envelope(&values, coefficient, &mut eroded);
            for (slot, value) in lane.iter_mut().zip(eroded) {
                *slot = value;
            }
        });
    }

    Ok(work.mapv(|v| T::saturating_from_f64((sign * v).round())))
}

/// `out[x] = min_q f[q] + a (x - q)²`, via the lower envelope of parabolas (Felzenszwalb-Huttenlocher).
fn lower_envelope(f: &[f64], a: f64, out: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut vertices = vec![0usize; n];
    let mut bounds = vec![0.0f64; n + 1];
    bounds[0] = f64::NEG_INFINITY;
    bounds[1] = f64::INFINITY;
    let mut k = 0usize;

    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + a * qf * qf) - (f[p] + a * pf * pf)) / (2.0 * a * (qf - pf))
    };

    for q in 1..n {
        let mut s = intersect(q, vertices[k]);
        while s <= bounds[k] {
            k -= 1;
            s = intersect(q, vertices[k]);
        }
        k += 1;
        vertices[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (x, slot) in out.iter_mut().enumerate() {
        let xf = x as f64;
        while bounds[k + 1] < xf {
            k += 1;
        }
        let q = vertices[k] as f64;
        *slot = a * (xf - q) * (xf - q) + f[vertices[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_matches_brute_force() {
        let f = [4.0, 0.0, 9.0, 2.0, 2.0, 7.0, 1.0];
        let a = 0.3;
        let mut fast = vec![0.0; f.len()];
        lower_envelope(&f, a, &mut fast);
        for (x, value) in fast.iter().enumerate() {
            let brute = f
                .iter()
                .enumerate()
                .map(|(q, fq)| fq + a * (x as f64 - q as f64).powi(2))
                .fold(f64::INFINITY, f64::min);
            assert!((value - brute).abs() < 1e-9);
        }
    }
}
