//! Edge layers derived from the camera-distance and point-density rasters.
//!
//! The same three layers feed both the digitizing aids (binary viewshed and
//! photo edges) and the reliability mask:
//! - skyline: deviation from the local mean of the range-of-range of point
//!   density, large where projected points suddenly stop
//! - edges: local range of camera distance, large at occlusion boundaries
//! - relative edges: edges divided by the local minimum camera distance, so
//!   close occlusions stand out over distant ones

use image::DynamicImage;
use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use super::thresholding::{apply_threshold, zero_where_above, zero_where_below};
use super::window::{
    deviation_from_mean, erode, normalized_edge, window_range, window_range_of_range, HalfWindow,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Window for ranges and normalization
    pub window: HalfWindow,
    /// Window of the mean subtracted from the skyline layer
    pub mean_window: HalfWindow,
    /// Skyline and edges are zeroed where point density exceeds this
    pub density_limit: f32,
    /// Relative edges are zeroed where point density exceeds this
    pub relative_density_limit: f32,
    /// Viewshed skyline contribution is zeroed closer than this to the camera
    pub near_distance: f32,
    /// Divisor of the absolute edge layer in the viewshed sum
    pub edge_scale: f32,
    /// Weight of the relative edge layer in the viewshed sum
    pub relative_weight: f32,
    pub view_threshold: f32,
    /// Threshold on the photo's local gray-value range
    pub image_threshold: f32,
    /// Thin binary edges with a window minimum
    pub thin: bool,
    pub thin_window: HalfWindow,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            window: HalfWindow::square(5),
            mean_window: HalfWindow::square(25),
            density_limit: 20.0,
            relative_density_limit: 50.0,
            near_distance: 2000.0,
            edge_scale: 500.0,
            relative_weight: 3.0,
            view_threshold: 1.5,
            image_threshold: 50.0,
            thin: true,
            thin_window: HalfWindow::square(2),
        }
    }
}

/// Density-filtered skyline, edge and relative edge layers.
#[derive(Debug, Clone)]
pub struct DistanceLayers {
    pub skyline: Array2<f32>,
    pub edges: Array2<f32>,
    pub relative_edges: Array2<f32>,
}

impl DistanceLayers {
    /// Compute the three layers and zero them where points are too sparse.
    ///
    /// # Panics
    /// If the two rasters differ in shape.
    pub fn compute(
        camera_distance: ArrayView2<f32>,
        point_density: ArrayView2<f32>,
        config: &EdgeConfig,
    ) -> Self {
        assert_eq!(
            camera_distance.dim(),
            point_density.dim(),
            "camera distance and point density shapes differ"
        );

        let density_edges = window_range_of_range(point_density, config.window);
        let mut skyline = deviation_from_mean(density_edges.view(), config.mean_window);

        let mut edges = window_range(camera_distance, config.window);
        let mut relative_edges = normalized_edge(edges.view(), camera_distance, config.window);

        zero_where_above(&mut skyline, point_density, config.density_limit);
        zero_where_above(&mut edges, point_density, config.density_limit);
        zero_where_above(
            &mut relative_edges,
            point_density,
            config.relative_density_limit,
        );

        Self {
            skyline,
            edges,
            relative_edges,
        }
    }
}

/// Binary outline of the projected terrain, for comparing against the photo.
pub fn viewshed_edges(
    camera_distance: ArrayView2<f32>,
    point_density: ArrayView2<f32>,
    config: &EdgeConfig,
) -> Array2<bool> {
    let layers = DistanceLayers::compute(camera_distance, point_density, config);

    let mut skyline = layers.skyline;
    zero_where_below(&mut skyline, camera_distance, config.near_distance);

    let mut combined = layers.edges;
    Zip::from(&mut combined)
        .and(&layers.relative_edges)
        .and(&skyline)
        .par_for_each(|e, &rel, &sky| {
            *e = *e / config.edge_scale + rel * config.relative_weight + sky;
        });

    finish(apply_threshold(combined.view(), config.view_threshold), config)
}

/// Binary edges of a grayscale photo.
pub fn image_edges(gray: ArrayView2<f32>, config: &EdgeConfig) -> Array2<bool> {
    let contrast = window_range(gray, config.window);
    finish(apply_threshold(contrast.view(), config.image_threshold), config)
}

fn finish(binary: Array2<bool>, config: &EdgeConfig) -> Array2<bool> {
    if config.thin {
        erode(binary.view(), config.thin_window)
    } else {
        binary
    }
}

/// Luminance of `image` on a 0-255 scale, shape `(height, width)`.
pub fn grayscale(image: &DynamicImage) -> Array2<f32> {
    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(r, c)| {
        f32::from(luma.get_pixel(c as u32, r as u32).0[0])
    })
}

/// Binary layer as a `{0, 1}` float array.
pub fn as_unit_layer(binary: ArrayView2<bool>) -> Array2<f32> {
    binary.mapv(|b| if b { 1.0 } else { 0.0 })
}
