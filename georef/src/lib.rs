//! Dense rasters and reliability masks for georeferenced camera images.
//!
//! Projected terrain points ([`georef_shared::CorrespondencePoint`]) are
//! spread onto the image grid as easting, northing, elevation and camera
//! distance rasters. A point-density raster and sliding-window edge layers
//! then mark where the projection cannot be trusted. Paired markers from a
//! digitizing viewer turn into ground control points or a polynomial
//! correction of projected pixel positions.

pub mod config;
pub mod correction;
pub mod error;
pub mod gcp;
pub mod image_proc;
pub mod markers;
pub mod pipeline;
pub mod shared_args;

pub use config::PipelineConfig;
pub use correction::{CorrectionError, CorrectionSample, PolynomialCorrection};
pub use error::PipelineError;
pub use pipeline::{run_pipeline, PipelineProducts};
