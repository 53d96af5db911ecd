//! Pipeline configuration.
//!
//! Every threshold and window of the raster stages lives here so a run can
//! be reproduced from one JSON file. Missing fields take their defaults.

use std::path::Path;

use georef_shared::DEFAULT_NODATA;
use serde::{Deserialize, Serialize};

use crate::image_proc::distance_field::DistanceFieldConfig;
use crate::image_proc::edges::EdgeConfig;
use crate::image_proc::interpolate::InterpolationMethod;
use crate::image_proc::mask::MaskConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sentinel written to cells without a value
    pub nodata: f32,
    /// Interpolation of the easting, northing and elevation rasters
    pub interpolation: InterpolationMethod,
    pub distance_field: DistanceFieldConfig,
    pub edges: EdgeConfig,
    pub mask: MaskConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            nodata: DEFAULT_NODATA,
            interpolation: InterpolationMethod::default(),
            distance_field: DistanceFieldConfig::default(),
            edges: EdgeConfig::default(),
            mask: MaskConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
