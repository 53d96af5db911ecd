//! Command line arguments shared by the raster binaries

use std::path::{Path, PathBuf};

use clap::Parser;
use georef_shared::{
    read_projected_file, CameraPosition, Crs, GeoTiffWriter, ImageSize, ProjectedPoint,
};

use crate::config::PipelineConfig;

/// Parse a camera position in format "easting,northing"
pub fn parse_camera(s: &str) -> Result<CameraPosition, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("Camera position must be in format 'easting,northing'".to_string());
    }

    let easting = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid easting value".to_string())?;
    let northing = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid northing value".to_string())?;

    Ok(CameraPosition::new(easting, northing))
}

/// Common arguments of binaries that run the raster pipeline
#[derive(Parser, Debug, Clone)]
pub struct SharedRasterArgs {
    /// Projected point file (header + PIXEL_ROW PIXEL_COL EASTING NORTHING ELEVATION)
    #[arg(long)]
    pub points: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: usize,

    /// Image height in pixels
    #[arg(long)]
    pub height: usize,

    /// Camera position in map coordinates (format: "easting,northing")
    #[arg(long, value_parser = parse_camera)]
    pub camera: CameraPosition,

    /// Pipeline configuration JSON; defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the output rasters
    #[arg(long, default_value = "georef_output")]
    pub output_dir: PathBuf,

    /// EPSG code of the map coordinate system stored in every raster
    #[arg(long, conflicts_with = "projection")]
    pub epsg: Option<u32>,

    /// File holding the projection WKT stored in every raster
    #[arg(long)]
    pub projection: Option<PathBuf>,
}

impl SharedRasterArgs {
    pub fn image_size(&self) -> ImageSize {
        ImageSize::from_width_height(self.width, self.height)
    }

    pub fn load_config(&self) -> std::io::Result<PipelineConfig> {
        match &self.config {
            Some(path) => {
                log::info!("loading configuration from {}", path.display());
                PipelineConfig::load_from_file(path)
            }
            None => Ok(PipelineConfig::default()),
        }
    }

    pub fn load_points(&self) -> anyhow::Result<Vec<ProjectedPoint>> {
        load_points(&self.points)
    }

    /// Coordinate system requested on the command line, if any.
    pub fn crs(&self) -> std::io::Result<Option<Crs>> {
        if let Some(code) = self.epsg {
            return Ok(Some(Crs::Epsg(code)));
        }
        match &self.projection {
            Some(path) => Ok(Some(Crs::Wkt(
                std::fs::read_to_string(path)?.trim().to_string(),
            ))),
            None => Ok(None),
        }
    }

    /// GeoTIFF sink for the output directory.
    pub fn raster_sink(&self) -> std::io::Result<GeoTiffWriter> {
        let writer = GeoTiffWriter::new(&self.output_dir);
        Ok(match self.crs()? {
            Some(crs) => writer.with_crs(crs),
            None => writer,
        })
    }
}

pub fn load_points(path: &Path) -> anyhow::Result<Vec<ProjectedPoint>> {
    let points = read_projected_file(path)
        .map_err(|e| anyhow::anyhow!("failed to read points from {}: {e}", path.display()))?;
    log::info!("loaded {} points from {}", points.len(), path.display());
    Ok(points)
}
