use georef_shared::RasterIoError;
use thiserror::Error;

use crate::image_proc::{DistanceFieldError, InterpolationError};

/// Errors from a full pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no input points")]
    NoInputPoints,

    #[error("interpolation failed: {0}")]
    Interpolation(#[from] InterpolationError),

    #[error("distance field failed: {0}")]
    DistanceField(#[from] DistanceFieldError),

    #[error("raster output failed: {0}")]
    RasterIo(#[from] RasterIoError),
}
