//! Sliding-window raster operators.
//!
//! Every operator is a separable reduction over a rectangular window that is
//! clipped at the raster border: near an edge the window shrinks rather than
//! reading padding. A half-window of `(rows, cols)` covers
//! `(2 * rows + 1) x (2 * cols + 1)` cells in the interior.
//!
//! Reductions run one row pass and one column pass, each parallel over
//! output rows. Inputs are only read.

use ndarray::{Array2, ArrayView2, Axis, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Half extent of a window in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfWindow {
    pub rows: usize,
    pub cols: usize,
}

impl HalfWindow {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub const fn square(half: usize) -> Self {
        Self::new(half, half)
    }
}

/// An associative reduction with an identity element.
pub trait WindowReduction<T>: Sync {
    fn identity(&self) -> T;
    fn combine(&self, a: T, b: T) -> T;
}

/// Minimum; for masks, "all set".
pub struct Min;
/// Maximum; for masks, "any set".
pub struct Max;
/// Sum in double precision.
pub struct Sum;

impl WindowReduction<f32> for Min {
    fn identity(&self) -> f32 {
        f32::INFINITY
    }

    fn combine(&self, a: f32, b: f32) -> f32 {
        a.min(b)
    }
}

impl WindowReduction<f32> for Max {
    fn identity(&self) -> f32 {
        f32::NEG_INFINITY
    }

    fn combine(&self, a: f32, b: f32) -> f32 {
        a.max(b)
    }
}

impl WindowReduction<bool> for Min {
    fn identity(&self) -> bool {
        true
    }

    fn combine(&self, a: bool, b: bool) -> bool {
        a && b
    }
}

impl WindowReduction<bool> for Max {
    fn identity(&self) -> bool {
        false
    }

    fn combine(&self, a: bool, b: bool) -> bool {
        a || b
    }
}

impl WindowReduction<f64> for Sum {
    fn identity(&self) -> f64 {
        0.0
    }

    fn combine(&self, a: f64, b: f64) -> f64 {
        a + b
    }
}

/// Clipped inclusive range `[center - half, center + half]` within `0..len`.
fn clipped(center: usize, half: usize, len: usize) -> std::ops::RangeInclusive<usize> {
    center.saturating_sub(half)..=(center + half).min(len - 1)
}

/// Reduce `input` over a clipped window around every cell.
pub fn reduce_window<T, R>(input: ArrayView2<T>, half: HalfWindow, reduction: &R) -> Array2<T>
where
    T: Copy + Send + Sync,
    R: WindowReduction<T>,
{
    let (rows, cols) = input.dim();
    if rows == 0 || cols == 0 {
        return input.to_owned();
    }

    // Along each row
    let mut horizontal = Array2::from_elem((rows, cols), reduction.identity());
    horizontal
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(r, mut out)| {
            let source = input.row(r);
            for c in 0..cols {
                out[c] = clipped(c, half.cols, cols)
                    .fold(reduction.identity(), |acc, k| reduction.combine(acc, source[k]));
            }
        });

    // Down each column
    let mut output = Array2::from_elem((rows, cols), reduction.identity());
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(r, mut out)| {
            for k in clipped(r, half.rows, rows) {
                Zip::from(&mut out)
                    .and(horizontal.row(k))
                    .for_each(|o, &h| *o = reduction.combine(*o, h));
            }
        });

    output
}

pub fn window_min(input: ArrayView2<f32>, half: HalfWindow) -> Array2<f32> {
    reduce_window(input, half, &Min)
}

pub fn window_max(input: ArrayView2<f32>, half: HalfWindow) -> Array2<f32> {
    reduce_window(input, half, &Max)
}

/// Window maximum minus window minimum; never negative.
pub fn window_range(input: ArrayView2<f32>, half: HalfWindow) -> Array2<f32> {
    let mut range = window_max(input, half);
    Zip::from(&mut range)
        .and(&window_min(input, half))
        .par_for_each(|hi, &lo| *hi -= lo);
    range
}

/// Range of the range layer; highlights where local contrast itself jumps.
pub fn window_range_of_range(input: ArrayView2<f32>, half: HalfWindow) -> Array2<f32> {
    let range = window_range(input, half);
    window_range(range.view(), half)
}

/// `edge / window_min(distance)`; cells whose denominator is zero keep `edge`.
pub fn normalized_edge(
    edge: ArrayView2<f32>,
    distance: ArrayView2<f32>,
    half: HalfWindow,
) -> Array2<f32> {
    assert_eq!(edge.dim(), distance.dim(), "edge and distance shapes differ");
    let local_min = window_min(distance, half);
    let mut out = edge.to_owned();
    Zip::from(&mut out)
        .and(&local_min)
        .par_for_each(|e, &d| {
            if d != 0.0 {
                *e /= d;
            }
        });
    out
}

/// Value minus the mean of its clipped window.
pub fn deviation_from_mean(input: ArrayView2<f32>, half: HalfWindow) -> Array2<f32> {
    let (rows, cols) = input.dim();
    let sums = reduce_window(input.mapv(f64::from).view(), half, &Sum);

    let mut out = Array2::<f32>::zeros((rows, cols));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(r, mut line)| {
            let row_span = clipped(r, half.rows, rows).count();
            for c in 0..cols {
                let count = row_span * clipped(c, half.cols, cols).count();
                let mean = sums[[r, c]] / count as f64;
                line[c] = (f64::from(input[[r, c]]) - mean) as f32;
            }
        });
    out
}

/// Grow set cells by the window (binary window maximum).
pub fn dilate(mask: ArrayView2<bool>, half: HalfWindow) -> Array2<bool> {
    reduce_window(mask, half, &Max)
}

/// Keep only cells whose whole window is set (binary window minimum).
pub fn erode(mask: ArrayView2<bool>, half: HalfWindow) -> Array2<bool> {
    reduce_window(mask, half, &Min)
}

#[cfg(test)]
mod tests;
