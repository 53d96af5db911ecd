//! Reliability masks.
//!
//! [`MaskStrategy::EdgeBuffered`] combines buffered occlusion edges, a
//! buffered skyline, strong and unstable distance jumps, sparse far terrain
//! and out-of-range distances into one exclusion layer. The mask keeps every
//! cell outside it. [`MaskStrategy::ColumnScan`] only cuts the sky off the
//! top of every column.

use georef_shared::ReliabilityMask;
use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use super::edges::{DistanceLayers, EdgeConfig};
use super::thresholding::{apply_threshold, threshold_inclusive, zero_where_above, zero_where_below};
use super::window::{dilate, window_min, window_range, HalfWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    /// Exclude the top of each column down to the first densely covered cell
    ColumnScan,
    /// Full buffered-edge rule set
    #[default]
    EdgeBuffered,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub strategy: MaskStrategy,
    /// Relative edges at or above this seed the close-edge buffers
    pub relative_edge_threshold: f32,
    /// Window of the local minimum camera distance around each seed
    pub local_min_window: HalfWindow,
    pub very_close_distance: f32,
    pub very_close_buffer: HalfWindow,
    pub close_distance: f32,
    pub close_buffer: HalfWindow,
    /// Skyline and sparse-point rules only apply beyond this share of the
    /// largest camera distance
    pub far_fraction: f32,
    pub skyline_threshold: f32,
    pub skyline_buffer: HalfWindow,
    pub unsecure_window: HalfWindow,
    pub edge_limit: f32,
    pub unsecure_limit: f32,
    /// Far cells are excluded where point density exceeds this
    pub sparse_density_limit: f32,
    pub max_distance: f32,
    /// Point density at which a column scan stops excluding
    pub column_density_limit: f32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            strategy: MaskStrategy::default(),
            relative_edge_threshold: 0.2,
            local_min_window: HalfWindow::square(5),
            very_close_distance: 2000.0,
            very_close_buffer: HalfWindow::square(35),
            close_distance: 5000.0,
            close_buffer: HalfWindow::square(25),
            far_fraction: 0.25,
            skyline_threshold: 3.0,
            skyline_buffer: HalfWindow::square(5),
            unsecure_window: HalfWindow::new(5, 11),
            edge_limit: 200.0,
            unsecure_limit: 500.0,
            sparse_density_limit: 9.0,
            max_distance: 35000.0,
            column_density_limit: 9.0,
        }
    }
}

/// Mask for the configured strategy.
pub fn build_mask(
    camera_distance: ArrayView2<f32>,
    point_density: ArrayView2<f32>,
    edges: &EdgeConfig,
    config: &MaskConfig,
) -> ReliabilityMask {
    match config.strategy {
        MaskStrategy::EdgeBuffered => {
            let exclusion = edge_buffered_exclusion(camera_distance, point_density, edges, config);
            ReliabilityMask::from_exclusion(&exclusion)
        }
        MaskStrategy::ColumnScan => column_scan_mask(point_density, config.column_density_limit),
    }
}

/// Cells excluded by the buffered-edge rules.
///
/// # Panics
/// If the two rasters differ in shape.
pub fn edge_buffered_exclusion(
    camera_distance: ArrayView2<f32>,
    point_density: ArrayView2<f32>,
    edges: &EdgeConfig,
    config: &MaskConfig,
) -> Array2<bool> {
    let layers = DistanceLayers::compute(camera_distance, point_density, edges);

    // Buffers around close occlusion edges
    let seed = threshold_inclusive(layers.relative_edges.view(), config.relative_edge_threshold);
    let local_min = window_min(camera_distance, config.local_min_window);
    let very_close = buffered_seed(
        &seed,
        local_min.view(),
        config.very_close_distance,
        config.very_close_buffer,
    );
    let close = buffered_seed(
        &seed,
        local_min.view(),
        config.close_distance,
        config.close_buffer,
    );

    // Buffer around the skyline, far terrain only
    let far_limit = max_finite(camera_distance) * config.far_fraction;
    let mut skyline = layers.skyline.mapv(|v| v.max(0.0));
    zero_where_below(&mut skyline, camera_distance, far_limit);
    zero_where_above(&mut skyline, point_density, edges.density_limit);
    let skyline_buffer = dilate(
        apply_threshold(skyline.view(), config.skyline_threshold).view(),
        config.skyline_buffer,
    );

    let unsecure = window_range(camera_distance, config.unsecure_window);

    let mut exclusion = very_close;
    Zip::from(&mut exclusion)
        .and(&close)
        .and(&skyline_buffer)
        .and(&layers.edges)
        .and(&unsecure)
        .par_for_each(|out, &close, &sky, &edge, &unsecure| {
            *out = *out
                || close
                || sky
                || edge > config.edge_limit
                || unsecure > config.unsecure_limit;
        });

    Zip::from(&mut exclusion)
        .and(&camera_distance)
        .and(&point_density)
        .par_for_each(|out, &distance, &density| {
            let sparse_far = density > config.sparse_density_limit && distance >= far_limit;
            *out = *out || sparse_far || distance > config.max_distance || distance <= 0.0;
        });

    log::debug!(
        "edge-buffered mask excludes {} of {} cells",
        exclusion.iter().filter(|&&e| e).count(),
        exclusion.len()
    );
    exclusion
}

/// Seed cells whose local minimum distance is at most `distance`, dilated.
fn buffered_seed(
    seed: &Array2<bool>,
    local_min: ArrayView2<f32>,
    distance: f32,
    buffer: HalfWindow,
) -> Array2<bool> {
    let mut selected = seed.clone();
    Zip::from(&mut selected)
        .and(&local_min)
        .par_for_each(|s, &m| *s = *s && m <= distance);
    dilate(selected.view(), buffer)
}

fn max_finite(values: ArrayView2<f32>) -> f32 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max)
        .max(0.0)
}

/// Per column, exclude cells from the top until point density first drops
/// to `density_limit` or below; that cell and everything beneath are kept.
pub fn column_scan_mask(point_density: ArrayView2<f32>, density_limit: f32) -> ReliabilityMask {
    let (rows, cols) = point_density.dim();
    let mut keep = Array2::from_elem((rows, cols), false);

    for (c, column) in point_density.columns().into_iter().enumerate() {
        if let Some(first) = column.iter().position(|&d| d <= density_limit) {
            keep.column_mut(c)
                .slice_mut(ndarray::s![first..])
                .fill(true);
        }
    }

    ReliabilityMask::new(keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_column_scan() {
        let density = array![
            [50.0, 3.0, 40.0],
            [12.0, 30.0, 40.0],
            [9.0, 40.0, 40.0],
            [30.0, 2.0, 40.0],
        ];
        let mask = column_scan_mask(density.view(), 9.0);
        let expected = array![
            [false, true, false],
            [false, true, false],
            [true, true, false],
            [true, true, false],
        ];
        assert_eq!(mask.view(), expected.view());
    }

    #[test]
    fn test_uniform_near_terrain_is_kept() {
        let camera = Array2::from_elem((60, 60), 3000.0f32);
        let density = Array2::from_elem((60, 60), 1.0f32);
        let mask = build_mask(
            camera.view(),
            density.view(),
            &EdgeConfig::default(),
            &MaskConfig::default(),
        );
        assert_eq!(mask.kept_count(), 3600);
    }

    #[test]
    fn test_distance_limits() {
        let mut camera = Array2::from_elem((20, 20), 3000.0f32);
        camera[[0, 0]] = 0.0;
        camera[[19, 19]] = 36000.0;
        let density = Array2::from_elem((20, 20), 1.0f32);
        let exclusion = edge_buffered_exclusion(
            camera.view(),
            density.view(),
            &EdgeConfig::default(),
            &MaskConfig::default(),
        );
        assert!(exclusion[[0, 0]]);
        assert!(exclusion[[19, 19]]);
    }

    #[test]
    fn test_sparse_far_terrain_is_excluded() {
        // Top rows are far and sparsely covered
        let camera = Array2::from_shape_fn((100, 40), |(r, _)| if r < 20 { 20000.0 } else { 1000.0 });
        let density = Array2::from_shape_fn((100, 40), |(r, _)| if r < 20 { 12.0 } else { 1.0 });
        let exclusion = edge_buffered_exclusion(
            camera.view(),
            density.view(),
            &EdgeConfig::default(),
            &MaskConfig::default(),
        );
        assert!(exclusion[[5, 20]]);
        // The distance step is a very close occlusion, buffered 35 rows
        assert!(exclusion[[55, 20]]);
        assert!(!exclusion[[99, 20]]);
    }

    #[test]
    fn test_close_occlusion_is_buffered() {
        let camera = Array2::from_shape_fn((100, 100), |(_, c)| if c < 50 { 1500.0 } else { 4000.0 });
        let density = Array2::from_elem((100, 100), 1.0f32);
        let exclusion = edge_buffered_exclusion(
            camera.view(),
            density.view(),
            &EdgeConfig::default(),
            &MaskConfig::default(),
        );
        // Within the 35 cell buffer of the edge
        assert!(exclusion[[50, 20]]);
        assert!(exclusion[[50, 80]]);
        // Outside every buffer
        assert!(!exclusion[[50, 0]]);
    }

    #[test]
    fn test_mask_is_binary_and_deterministic() {
        let camera = Array2::from_shape_fn((50, 50), |(r, c)| 500.0 + (r * 50 + c * 13) as f32);
        let density = Array2::from_shape_fn((50, 50), |(r, c)| ((r * 7 + c * 3) % 25) as f32);
        let config = MaskConfig::default();
        let first = build_mask(camera.view(), density.view(), &EdgeConfig::default(), &config);
        let second = build_mask(camera.view(), density.view(), &EdgeConfig::default(), &config);
        assert_eq!(first, second);

        let raster = first.to_raster(georef_shared::DEFAULT_NODATA);
        assert!(raster.values().iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
