//! Scattered points to dense rasters.
//!
//! A [`ScatteredGrid`] is built once per point set and grid size. It snaps
//! every point to its pixel cell, drops duplicate cells (the last point
//! written to a cell wins) and precomputes the nearest point of every cell,
//! so each additional attribute raster only costs a gather. Linear
//! interpolation triangulates the same sites lazily on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use georef_math::{Locatable2d, PointIndex};
use georef_shared::{ImageSize, Raster};
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    #[error("no input points")]
    NoInputPoints,

    #[error("grid {0} has no cells")]
    EmptyGrid(ImageSize),

    #[error("expected one value per point ({expected}), got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// How attribute values are spread from points to cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Value of the closest point; ties go to the earlier point
    #[default]
    Nearest,
    /// Barycentric inside the convex hull, nodata outside
    Linear,
    /// Barycentric inside the convex hull, nearest outside
    LinearNearestFill,
}

#[derive(Debug, Clone, Copy)]
struct Site {
    position: Point2<f64>,
    /// Index of the contributing input point
    source: usize,
}

impl HasPosition for Site {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Point set snapped to a grid, ready to produce attribute rasters.
pub struct ScatteredGrid {
    size: ImageSize,
    nodata: f32,
    point_count: usize,
    sites: Vec<Site>,
    /// Nearest site per cell
    nearest: Array2<u32>,
    triangulation: OnceLock<Result<DelaunayTriangulation<Site>, InterpolationError>>,
}

impl ScatteredGrid {
    /// Snap `points` (x = column, y = row) onto a grid of `size`.
    ///
    /// # Errors
    /// * `InterpolationError::NoInputPoints` - `points` is empty
    /// * `InterpolationError::EmptyGrid` - `size` has no cells
    pub fn new<T: Locatable2d>(
        points: &[T],
        size: ImageSize,
        nodata: f32,
    ) -> Result<Self, InterpolationError> {
        if points.is_empty() {
            return Err(InterpolationError::NoInputPoints);
        }
        if size.is_empty() {
            return Err(InterpolationError::EmptyGrid(size));
        }

        let sites = unique_sites(points);
        let positions: Vec<[f64; 2]> = sites
            .iter()
            .map(|s| [s.position.x, s.position.y])
            .collect();
        let index = PointIndex::new(&positions);

        let mut nearest = Array2::<u32>::zeros(size.shape());
        nearest
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut cells)| {
                for (col, cell) in cells.iter_mut().enumerate() {
                    // The index is never empty here
                    if let Some(hit) = index.nearest([col as f64, row as f64]) {
                        *cell = hit.index as u32;
                    }
                }
            });

        log::debug!(
            "snapped {} points to {} unique cells on a {} grid",
            points.len(),
            sites.len(),
            size
        );

        Ok(Self {
            size,
            nodata,
            point_count: points.len(),
            sites,
            nearest,
            triangulation: OnceLock::new(),
        })
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of distinct cells holding at least one point.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Input point index whose value lands in `(row, col)` under nearest mode.
    pub fn nearest_point(&self, row: usize, col: usize) -> usize {
        self.sites[self.nearest[[row, col]] as usize].source
    }

    /// Raster of `values` (one per input point, in input order).
    pub fn interpolate(
        &self,
        values: &[f64],
        method: InterpolationMethod,
    ) -> Result<Raster, InterpolationError> {
        if values.len() != self.point_count {
            return Err(InterpolationError::ValueCount {
                expected: self.point_count,
                got: values.len(),
            });
        }

        match method {
            InterpolationMethod::Nearest => Ok(self.nearest_raster(values)),
            InterpolationMethod::Linear => self.linear_raster(values, false),
            InterpolationMethod::LinearNearestFill => self.linear_raster(values, true),
        }
    }

    fn nearest_raster(&self, values: &[f64]) -> Raster {
        let data = self
            .nearest
            .mapv(|site| values[self.sites[site as usize].source] as f32);
        Raster::new(data, self.nodata)
    }

    fn linear_raster(&self, values: &[f64], fill: bool) -> Result<Raster, InterpolationError> {
        let triangulation = self
            .triangulation
            .get_or_init(|| {
                DelaunayTriangulation::<Site>::bulk_load_stable(self.sites.clone())
                    .map_err(|e| InterpolationError::Triangulation(format!("{e:?}")))
            })
            .as_ref()
            .map_err(Clone::clone)?;

        let mut data = Array2::<f32>::from_elem(self.size.shape(), self.nodata);
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut cells)| {
                let barycentric = triangulation.barycentric();
                for (col, cell) in cells.iter_mut().enumerate() {
                    let query = Point2::new(col as f64, row as f64);
                    match barycentric.interpolate(|v| values[v.data().source], query) {
                        Some(value) => *cell = value as f32,
                        None if fill => {
                            let site = self.nearest[[row, col]] as usize;
                            *cell = values[self.sites[site].source] as f32;
                        }
                        None => {}
                    }
                }
            });

        Ok(Raster::new(data, self.nodata))
    }
}

/// One site per occupied cell, holding the last point written there, in
/// ascending order of that point's input index.
fn unique_sites<T: Locatable2d>(points: &[T]) -> Vec<Site> {
    let mut last_by_cell: HashMap<(u64, u64), usize> = HashMap::with_capacity(points.len());
    for (index, point) in points.iter().enumerate() {
        last_by_cell.insert((point.x().to_bits(), point.y().to_bits()), index);
    }

    let mut sources: Vec<usize> = last_by_cell.into_values().collect();
    sources.sort_unstable();

    sources
        .into_iter()
        .map(|source| Site {
            position: Point2::new(points[source].x(), points[source].y()),
            source,
        })
        .collect()
}
