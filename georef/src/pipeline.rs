//! Points in, rasters and mask out.
//!
//! One call runs every stage from scratch. Nothing is cached between runs;
//! after a correction the caller passes the corrected point set again.

use georef_shared::{
    attach_camera, CameraPosition, CorrespondencePoint, ImageSize, Raster, RasterIoError,
    RasterSink, ReliabilityMask,
};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::image_proc::edges::{as_unit_layer, image_edges, viewshed_edges, EdgeConfig};
use crate::image_proc::{build_mask, distance_field, InterpolationMethod, ScatteredGrid};

/// Rasters produced by one run, all of the requested grid size.
#[derive(Debug, Clone)]
pub struct PipelineProducts {
    pub east: Raster,
    pub north: Raster,
    pub elevation: Raster,
    pub camera_distance: Raster,
    pub point_density: Raster,
    pub mask: ReliabilityMask,
}

impl PipelineProducts {
    /// Write every product under its conventional name.
    pub fn write_products(&self, sink: &mut dyn RasterSink) -> Result<(), RasterIoError> {
        sink.write_raster("east_raster", &self.east)?;
        sink.write_raster("north_raster", &self.north)?;
        sink.write_raster("alt_raster", &self.elevation)?;
        sink.write_raster("dist_raster", &self.camera_distance)?;
        sink.write_raster("point_distance", &self.point_density)?;
        sink.write_raster("mask", &self.mask.to_raster(self.east.nodata_value()))
    }

    /// Binary viewshed edge raster for digitizing control points.
    pub fn viewshed_edges(&self, config: &EdgeConfig) -> Raster {
        let edges = viewshed_edges(
            self.camera_distance.view(),
            self.point_density.view(),
            config,
        );
        Raster::new(as_unit_layer(edges.view()), self.camera_distance.nodata_value())
    }
}

/// Binary edge raster of a grayscale photo.
pub fn photo_edges(gray: &Raster, config: &EdgeConfig) -> Raster {
    let edges = image_edges(gray.view(), config);
    Raster::new(as_unit_layer(edges.view()), gray.nodata_value())
}

/// Run every raster stage for `points` on a grid of `size`.
///
/// Camera distances are recomputed from `camera`. The camera-distance
/// raster always uses nearest interpolation; the coordinate rasters use the
/// configured method.
pub fn run_pipeline(
    points: &[CorrespondencePoint],
    size: ImageSize,
    camera: &CameraPosition,
    config: &PipelineConfig,
) -> Result<PipelineProducts, PipelineError> {
    if points.is_empty() {
        return Err(PipelineError::NoInputPoints);
    }

    log::info!("processing {} points on a {size} grid", points.len());
    let points = attach_camera(points, camera);

    log::info!("interpolating coordinate rasters ({:?})", config.interpolation);
    let grid = ScatteredGrid::new(&points, size, config.nodata)?;
    let attribute = |value: fn(&CorrespondencePoint) -> f64| -> Vec<f64> {
        points.iter().map(value).collect()
    };
    let east = grid.interpolate(&attribute(|p| p.easting), config.interpolation)?;
    let north = grid.interpolate(&attribute(|p| p.northing), config.interpolation)?;
    let elevation = grid.interpolate(&attribute(|p| p.elevation), config.interpolation)?;
    let camera_distance = grid.interpolate(
        &attribute(|p| p.distance_to_camera),
        InterpolationMethod::Nearest,
    )?;

    log::info!("computing point density");
    let point_density = distance_field(&points, size, &config.distance_field, config.nodata)?;

    log::info!("building {:?} mask", config.mask.strategy);
    let mask = build_mask(
        camera_distance.view(),
        point_density.view(),
        &config.edges,
        &config.mask,
    );
    log::info!(
        "mask keeps {} of {} cells",
        mask.kept_count(),
        size.pixel_count()
    );

    Ok(PipelineProducts {
        east,
        north,
        elevation,
        camera_distance,
        point_density,
        mask,
    })
}
