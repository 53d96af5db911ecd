//! Raster persistence boundary.
//!
//! Processing stages hand finished rasters to a [`RasterSink`]. The bundled
//! sink writes single-band float32 GeoTIFFs through GDAL with the geotransform,
//! an optional coordinate reference system and the nodata sentinel set on the
//! dataset. Rasters stay in image space by default: the top-left corner sits
//! at the origin and y decreases downward, so a cell `(row, col)` is displayed
//! at `(col, -row)`.

use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::{Raster, DEFAULT_NODATA};

#[derive(Error, Debug)]
pub enum RasterIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("band shape: {0}")]
    Shape(String),
}

/// Placement of a north-up raster in map or display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// x of the top-left corner of cell (0, 0)
    pub top_left_x: f64,
    /// y of the top-left corner of cell (0, 0)
    pub top_left_y: f64,
    pub cell_size: f64,
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            cell_size: 1.0,
        }
    }
}

impl GeoTransform {
    /// GDAL's six-coefficient affine form, north up.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.cell_size,
            0.0,
            self.top_left_y,
            0.0,
            -self.cell_size,
        ]
    }

    /// North-up transform from GDAL coefficients; rotation terms are ignored.
    pub fn from_gdal(coefficients: &[f64; 6]) -> Self {
        Self {
            top_left_x: coefficients[0],
            top_left_y: coefficients[3],
            cell_size: coefficients[1],
        }
    }
}

/// Coordinate reference system attached to written rasters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    Epsg(u32),
    Wkt(String),
}

impl Crs {
    fn to_spatial_ref(&self) -> Result<SpatialRef, RasterIoError> {
        Ok(match self {
            Crs::Epsg(code) => SpatialRef::from_epsg(*code)?,
            Crs::Wkt(wkt) => SpatialRef::from_wkt(wkt)?,
        })
    }
}

/// Destination for named output rasters.
pub trait RasterSink {
    fn write_raster(&mut self, name: &str, raster: &Raster) -> Result<(), RasterIoError>;
}

/// Sink that keeps rasters in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rasters: Vec<(String, Raster)>,
}

impl MemorySink {
    pub fn get(&self, name: &str) -> Option<&Raster> {
        self.rasters
            .iter()
            .find(|(stored, _)| stored == name)
            .map(|(_, raster)| raster)
    }
}

impl RasterSink for MemorySink {
    fn write_raster(&mut self, name: &str, raster: &Raster) -> Result<(), RasterIoError> {
        self.rasters.push((name.to_string(), raster.clone()));
        Ok(())
    }
}

/// Writes `<directory>/<name>.tif`.
#[derive(Debug, Clone)]
pub struct GeoTiffWriter {
    directory: PathBuf,
    transform: GeoTransform,
    crs: Option<Crs>,
}

impl GeoTiffWriter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            transform: GeoTransform::default(),
            crs: None,
        }
    }

    pub fn with_transform(mut self, transform: GeoTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Path the raster called `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.tif"))
    }
}

impl RasterSink for GeoTiffWriter {
    fn write_raster(&mut self, name: &str, raster: &Raster) -> Result<(), RasterIoError> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(name);
        write_geotiff(&path, raster, &self.transform, self.crs.as_ref())?;

        log::info!(
            "wrote {} ({}x{})",
            path.display(),
            raster.width(),
            raster.height()
        );
        Ok(())
    }
}

/// Write one raster as a single-band float32 GeoTIFF.
pub fn write_geotiff(
    path: &Path,
    raster: &Raster,
    transform: &GeoTransform,
    crs: Option<&Crs>,
) -> Result<(), RasterIoError> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let (width, height) = (raster.width(), raster.height());

    let mut dataset =
        driver.create_with_band_type::<f32, _>(path, width as isize, height as isize, 1)?;
    dataset.set_geo_transform(&transform.to_gdal())?;
    if let Some(crs) = crs {
        dataset.set_spatial_ref(&crs.to_spatial_ref()?)?;
    }

    let mut band = dataset.rasterband(1)?;
    let data: Vec<f32> = raster.values().iter().copied().collect();
    let buffer = Buffer::new((width, height), data);
    band.write((0, 0), (width, height), &buffer)?;
    band.set_no_data_value(Some(f64::from(raster.nodata_value())))?;
    Ok(())
}

/// Read band 1 of any GDAL raster as a [`Raster`].
///
/// A band without a nodata value falls back to [`DEFAULT_NODATA`].
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<(Raster, GeoTransform), RasterIoError> {
    let dataset = Dataset::open(path.as_ref())?;
    let transform = GeoTransform::from_gdal(&dataset.geo_transform()?);
    let (width, height) = dataset.raster_size();

    let band = dataset.rasterband(1)?;
    let nodata = band.no_data_value().map_or(DEFAULT_NODATA, |v| v as f32);
    let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

    let values = Array2::from_shape_vec((height, width), buffer.data)
        .map_err(|e| RasterIoError::Shape(e.to_string()))?;

    Ok((Raster::new(values, nodata), transform))
}
