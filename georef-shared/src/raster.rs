//! In-memory raster and mask values.
//!
//! Row 0 is the top of the image. Indexing outside the grid panics; callers
//! inside the processing core are expected to stay in bounds.

use ndarray::{Array2, ArrayView2};

use crate::image_size::ImageSize;

/// Nodata sentinel used unless a caller picks another.
pub const DEFAULT_NODATA: f32 = -9999.0;

/// Dense single-band `f32` raster with a nodata sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    values: Array2<f32>,
    nodata: f32,
}

impl Raster {
    pub fn new(values: Array2<f32>, nodata: f32) -> Self {
        Self { values, nodata }
    }

    /// Raster of `size` filled with `value`.
    pub fn filled(size: ImageSize, value: f32, nodata: f32) -> Self {
        Self::new(size.filled(value), nodata)
    }

    /// Raster of `size` where every cell is nodata.
    pub fn nodata(size: ImageSize, nodata: f32) -> Self {
        Self::filled(size, nodata, nodata)
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::of_array(&self.values)
    }

    pub fn nodata_value(&self) -> f32 {
        self.nodata
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[[row, col]]
    }

    pub fn is_nodata(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == self.nodata
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f32> {
        self.values
    }

    /// Largest value that is not nodata, if any.
    pub fn max_valid(&self) -> Option<f32> {
        self.values
            .iter()
            .copied()
            .filter(|&v| v != self.nodata && !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
    }
}

/// Binary keep/exclude mask. `true` (written as 1) means the cell is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReliabilityMask {
    keep: Array2<bool>,
}

impl ReliabilityMask {
    pub fn new(keep: Array2<bool>) -> Self {
        Self { keep }
    }

    /// Mask that keeps every cell outside `exclusion`.
    pub fn from_exclusion(exclusion: &Array2<bool>) -> Self {
        Self::new(exclusion.mapv(|excluded| !excluded))
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::of_array(&self.keep)
    }

    pub fn is_kept(&self, row: usize, col: usize) -> bool {
        self.keep[[row, col]]
    }

    pub fn kept_count(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    pub fn view(&self) -> ArrayView2<'_, bool> {
        self.keep.view()
    }

    /// Mask as a `{0, 1}` raster for persistence.
    pub fn to_raster(&self, nodata: f32) -> Raster {
        Raster::new(self.keep.mapv(|k| if k { 1.0 } else { 0.0 }), nodata)
    }
}
