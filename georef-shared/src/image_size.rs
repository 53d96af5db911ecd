//! Raster grid dimensions

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid dimensions of an image or raster.
///
/// Arrays built from it are row-major with shape `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl ImageSize {
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Size of an existing `(rows, cols)` array.
    pub fn of_array<T>(array: &Array2<T>) -> Self {
        let (height, width) = array.dim();
        Self { width, height }
    }

    /// Array of `value` with shape `(height, width)`.
    pub fn filled<T: Clone>(&self, value: T) -> Array2<T> {
        Array2::from_elem(self.shape(), value)
    }

    /// `(rows, cols)` as ndarray expects it.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// True when `(row, col)` addresses a cell of this grid.
    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }
}

impl From<(usize, usize)> for ImageSize {
    /// From `(width, height)`.
    fn from(dimensions: (usize, usize)) -> Self {
        Self::from_width_height(dimensions.0, dimensions.1)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
