//! Distance from every cell to the nearest correspondence point.
//!
//! Exact distances are only computed on a coarse lattice of every `stride`-th
//! row and column. Each full-resolution cell then copies the value of its
//! nearest lattice node, ties going to the upper-left node. Very large point
//! sets are thinned to at most `max_points` by taking every n-th point.

use georef_math::{Locatable2d, PointIndex};
use georef_shared::{ImageSize, Raster};
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistanceFieldError {
    #[error("no input points")]
    NoInputPoints,

    #[error("lattice stride must be at least 1")]
    ZeroStride,

    #[error("grid {0} has no cells")]
    EmptyGrid(ImageSize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceFieldConfig {
    /// Spacing of the exact-distance lattice in cells
    pub stride: usize,
    /// Upper bound on points used for the distance computation
    pub max_points: usize,
}

impl Default for DistanceFieldConfig {
    fn default() -> Self {
        Self {
            stride: 4,
            max_points: 100_000,
        }
    }
}

impl DistanceFieldConfig {
    /// Point subsampling step for a set of `count` points.
    pub fn point_step(&self, count: usize) -> usize {
        (count / self.max_points.max(1)).max(1)
    }
}

/// Index of the lattice node nearest to `position` along one axis.
///
/// `last` is the highest lattice index on that axis. An exact midpoint
/// resolves to the lower node.
fn nearest_node(position: usize, stride: usize, last: usize) -> usize {
    let lower = position / stride;
    let remainder = position % stride;
    if remainder * 2 > stride && lower < last {
        lower + 1
    } else {
        lower
    }
}

/// Nearest-point distance raster of `size`.
pub fn distance_field<T: Locatable2d>(
    points: &[T],
    size: ImageSize,
    config: &DistanceFieldConfig,
    nodata: f32,
) -> Result<Raster, DistanceFieldError> {
    if points.is_empty() {
        return Err(DistanceFieldError::NoInputPoints);
    }
    if config.stride == 0 {
        return Err(DistanceFieldError::ZeroStride);
    }
    if size.is_empty() {
        return Err(DistanceFieldError::EmptyGrid(size));
    }

    let step = config.point_step(points.len());
    let selected: Vec<[f64; 2]> = points
        .iter()
        .step_by(step)
        .map(|p| [p.x(), p.y()])
        .collect();
    let index = PointIndex::new(&selected);

    let stride = config.stride;
    let lattice_rows = (size.height - 1) / stride + 1;
    let lattice_cols = (size.width - 1) / stride + 1;

    log::debug!(
        "distance field: {} of {} points (step {step}), {lattice_rows}x{lattice_cols} lattice",
        selected.len(),
        points.len()
    );

    let mut lattice = Array2::<f32>::zeros((lattice_rows, lattice_cols));
    lattice
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut nodes)| {
            let row = (i * stride) as f64;
            for (j, node) in nodes.iter_mut().enumerate() {
                let col = (j * stride) as f64;
                if let Some(hit) = index.nearest([col, row]) {
                    *node = hit.distance() as f32;
                }
            }
        });

    let col_nodes: Vec<usize> = (0..size.width)
        .map(|c| nearest_node(c, stride, lattice_cols - 1))
        .collect();

    let mut field = Array2::<f32>::zeros(size.shape());
    field
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(r, mut cells)| {
            let source = lattice.row(nearest_node(r, stride, lattice_rows - 1));
            for (cell, &node) in cells.iter_mut().zip(&col_nodes) {
                *cell = source[node];
            }
        });

    Ok(Raster::new(field, nodata))
}
