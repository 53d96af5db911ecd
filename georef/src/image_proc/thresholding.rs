//! Thresholding and conditional zeroing of raster layers

use ndarray::{Array2, ArrayView2, Zip};

/// Binary mask of cells strictly above `threshold`.
pub fn apply_threshold(image: ArrayView2<f32>, threshold: f32) -> Array2<bool> {
    let mut mask = Array2::from_elem(image.dim(), false);
    Zip::from(&mut mask)
        .and(&image)
        .par_for_each(|m, &v| *m = v > threshold);
    mask
}

/// Binary mask of cells at or above `threshold`.
pub fn threshold_inclusive(image: ArrayView2<f32>, threshold: f32) -> Array2<bool> {
    let mut mask = Array2::from_elem(image.dim(), false);
    Zip::from(&mut mask)
        .and(&image)
        .par_for_each(|m, &v| *m = v >= threshold);
    mask
}

/// Set `layer` to zero wherever `reference` exceeds `limit`.
pub fn zero_where_above(layer: &mut Array2<f32>, reference: ArrayView2<f32>, limit: f32) {
    Zip::from(layer).and(&reference).par_for_each(|v, &r| {
        if r > limit {
            *v = 0.0;
        }
    });
}

/// Set `layer` to zero wherever `reference` is below `limit`.
pub fn zero_where_below(layer: &mut Array2<f32>, reference: ArrayView2<f32>, limit: f32) {
    Zip::from(layer).and(&reference).par_for_each(|v, &r| {
        if r < limit {
            *v = 0.0;
        }
    });
}
