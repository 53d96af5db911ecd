//! Shared data types for the georeferencing workspace.
//!
//! Rasters and masks, correspondence points, the GCP text format and the
//! raster persistence boundary live here so that the processing crate and
//! its binaries agree on a single set of types.

pub mod gcp_file;
pub mod image_size;
pub mod points;
pub mod raster;
pub mod raster_io;

pub use gcp_file::{
    read_gcp_file, read_gcp_path, write_gcp_file, write_gcp_path, GcpFileError, GcpRecord,
};
pub use image_size::ImageSize;
pub use points::{
    attach_camera, read_points, read_projected, read_projected_file, write_projected,
    CameraPosition, CorrespondencePoint, PointFileError, ProjectedPoint,
};
pub use raster::{Raster, ReliabilityMask, DEFAULT_NODATA};
pub use raster_io::{
    read_geotiff, write_geotiff, Crs, GeoTiffWriter, GeoTransform, MemorySink, RasterIoError,
    RasterSink,
};
