//! Correspondence points produced by the terrain projection.
//!
//! Each point ties an image cell to a map coordinate. The projection engine
//! emits real-valued pixel positions; they are truncated toward zero when a
//! point is built so every point addresses exactly one cell.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use georef_math::Locatable2d;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column header of the plain-text point file.
pub const POINT_FILE_HEADER: &str = "PIXEL_ROW PIXEL_COL EASTING NORTHING ELEVATION";

#[derive(Error, Debug)]
pub enum PointFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Horizontal camera location in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub easting: f64,
    pub northing: f64,
}

impl CameraPosition {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    /// Horizontal distance from the camera to `(easting, northing)`.
    pub fn horizontal_distance(&self, easting: f64, northing: f64) -> f64 {
        (easting - self.easting).hypot(northing - self.northing)
    }
}

/// A projected terrain point as the engine reports it, with real-valued
/// pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub row: f64,
    pub col: f64,
    pub easting: f64,
    pub northing: f64,
    pub elevation: f64,
}

impl ProjectedPoint {
    /// Snap to the containing cell.
    pub fn to_correspondence(&self) -> CorrespondencePoint {
        CorrespondencePoint::from_projection(
            self.row,
            self.col,
            self.easting,
            self.northing,
            self.elevation,
        )
    }
}

/// One image-pixel to map-coordinate correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrespondencePoint {
    pub pixel_row: i64,
    pub pixel_col: i64,
    pub easting: f64,
    pub northing: f64,
    pub elevation: f64,
    /// Derived from the camera position, see [`CorrespondencePoint::with_camera`]
    pub distance_to_camera: f64,
}

impl CorrespondencePoint {
    /// Point from real-valued engine output; pixel positions truncate toward zero.
    pub fn from_projection(row: f64, col: f64, easting: f64, northing: f64, elevation: f64) -> Self {
        Self {
            pixel_row: row.trunc() as i64,
            pixel_col: col.trunc() as i64,
            easting,
            northing,
            elevation,
            distance_to_camera: 0.0,
        }
    }

    /// Copy of this point with its camera distance recomputed.
    pub fn with_camera(self, camera: &CameraPosition) -> Self {
        Self {
            distance_to_camera: camera.horizontal_distance(self.easting, self.northing),
            ..self
        }
    }
}

impl Locatable2d for CorrespondencePoint {
    fn x(&self) -> f64 {
        self.pixel_col as f64
    }

    fn y(&self) -> f64 {
        self.pixel_row as f64
    }
}

/// Recompute `distance_to_camera` for every point.
pub fn attach_camera(points: &[CorrespondencePoint], camera: &CameraPosition) -> Vec<CorrespondencePoint> {
    points.iter().map(|p| p.with_camera(camera)).collect()
}

/// Read projected points from a whitespace-separated text stream.
///
/// The first non-empty line is the header and is skipped. Blank lines are
/// ignored.
pub fn read_projected<R: Read>(reader: R) -> Result<Vec<ProjectedPoint>, PointFileError> {
    let mut points = Vec::new();
    let mut seen_header = false;

    for (number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen_header {
            seen_header = true;
            continue;
        }

        let fields = trimmed
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|e| PointFileError::Parse {
                    line: number + 1,
                    message: format!("invalid number '{field}': {e}"),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        if fields.len() < 5 {
            return Err(PointFileError::Parse {
                line: number + 1,
                message: format!("expected 5 columns, found {}", fields.len()),
            });
        }

        points.push(ProjectedPoint {
            row: fields[0],
            col: fields[1],
            easting: fields[2],
            northing: fields[3],
            elevation: fields[4],
        });
    }

    log::debug!("read {} projected points", points.len());
    Ok(points)
}

/// Read points and snap them to cells. Camera distances are left at zero.
pub fn read_points<R: Read>(reader: R) -> Result<Vec<CorrespondencePoint>, PointFileError> {
    Ok(read_projected(reader)?
        .iter()
        .map(ProjectedPoint::to_correspondence)
        .collect())
}

pub fn read_projected_file<P: AsRef<Path>>(path: P) -> Result<Vec<ProjectedPoint>, PointFileError> {
    read_projected(std::fs::File::open(path)?)
}

/// Write projected points in the format [`read_projected`] accepts.
pub fn write_projected<W: Write>(
    mut writer: W,
    points: &[ProjectedPoint],
) -> Result<(), PointFileError> {
    writeln!(writer, "{POINT_FILE_HEADER}")?;
    for p in points {
        writeln!(
            writer,
            "{} {} {} {} {}",
            p.row, p.col, p.easting, p.northing, p.elevation
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_truncation_toward_zero() {
        let p = CorrespondencePoint::from_projection(3.9, -0.7, 1.0, 2.0, 3.0);
        assert_eq!(p.pixel_row, 3);
        assert_eq!(p.pixel_col, 0);
    }

    #[test]
    fn test_camera_distance_is_horizontal() {
        let camera = CameraPosition::new(100.0, 200.0);
        let p = CorrespondencePoint::from_projection(0.0, 0.0, 103.0, 204.0, 5000.0).with_camera(&camera);
        assert_relative_eq!(p.distance_to_camera, 5.0);
    }

    #[test]
    fn test_locatable_uses_col_as_x() {
        let p = CorrespondencePoint::from_projection(10.0, 20.0, 0.0, 0.0, 0.0);
        assert_eq!(p.x(), 20.0);
        assert_eq!(p.y(), 10.0);
    }

    #[test]
    fn test_read_points_skips_header_and_blank_lines() {
        let text = "PIXEL_ROW PIXEL_COL EASTING NORTHING ELEVATION\n\
                    12.6 4.2 600000.5 5100000.25 812.0\n\
                    \n\
                    0 0 1 2 3\n";
        let points = read_points(text.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].pixel_row, 12);
        assert_eq!(points[0].pixel_col, 4);
        assert_eq!(points[0].northing, 5100000.25);
        assert_eq!(points[1].elevation, 3.0);
    }

    #[test]
    fn test_read_points_reports_line() {
        let text = "header\n1 2 3 4 5\n1 2 x 4 5\n";
        match read_points(text.as_bytes()) {
            Err(PointFileError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_written_file_keeps_fractional_pixels() {
        let points = vec![
            ProjectedPoint {
                row: 1.75,
                col: 2.5,
                easting: 10.5,
                northing: 20.5,
                elevation: 30.5,
            },
            ProjectedPoint {
                row: 7.0,
                col: 9.0,
                easting: -1.0,
                northing: -2.0,
                elevation: 0.0,
            },
        ];
        let mut buffer = Vec::new();
        write_projected(&mut buffer, &points).unwrap();
        assert_eq!(read_projected(buffer.as_slice()).unwrap(), points);

        let snapped = read_points(buffer.as_slice()).unwrap();
        assert_eq!((snapped[0].pixel_row, snapped[0].pixel_col), (1, 2));
    }
}
