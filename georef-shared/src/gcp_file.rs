//! Ground control point text file.
//!
//! One header line followed by one space-separated record per line:
//! `POINT_X POINT_Y POINT_Z PIXEL_COL PIXEL_ROW NAME`. Map coordinates come
//! first, then the image cell the point was identified at.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use thiserror::Error;

pub const GCP_FILE_HEADER: &str = "POINT_X POINT_Y POINT_Z PIXEL_COL PIXEL_ROW NAME";

#[derive(Error, Debug)]
pub enum GcpFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("GCP name '{0}' is empty or contains whitespace")]
    InvalidName(String),
}

/// A single ground control point.
#[derive(Debug, Clone, PartialEq)]
pub struct GcpRecord {
    /// Map easting (`POINT_X`)
    pub easting: f64,
    /// Map northing (`POINT_Y`)
    pub northing: f64,
    /// Elevation (`POINT_Z`)
    pub elevation: f64,
    pub pixel_col: i64,
    pub pixel_row: i64,
    pub name: String,
}

/// Write `records` with the GCP header.
///
/// Names are written as single tokens, so an empty name or one containing
/// whitespace is rejected before anything is written.
pub fn write_gcp_file<W: Write>(mut writer: W, records: &[GcpRecord]) -> Result<(), GcpFileError> {
    validate_names(records)?;
    writeln!(writer, "{GCP_FILE_HEADER}")?;
    for record in records {
        writeln!(
            writer,
            "{} {} {} {} {} {}",
            record.easting,
            record.northing,
            record.elevation,
            record.pixel_col,
            record.pixel_row,
            record.name
        )?;
    }
    Ok(())
}

fn validate_names(records: &[GcpRecord]) -> Result<(), GcpFileError> {
    match records
        .iter()
        .find(|r| r.name.is_empty() || r.name.chars().any(char::is_whitespace))
    {
        Some(bad) => Err(GcpFileError::InvalidName(bad.name.clone())),
        None => Ok(()),
    }
}

/// Create `path` and write `records` to it; no file is created for invalid names.
pub fn write_gcp_path<P: AsRef<Path>>(path: P, records: &[GcpRecord]) -> Result<(), GcpFileError> {
    validate_names(records)?;
    let file = std::fs::File::create(path)?;
    write_gcp_file(std::io::BufWriter::new(file), records)
}

/// Read a GCP file, skipping the header line.
pub fn read_gcp_file<R: Read>(reader: R) -> Result<Vec<GcpRecord>, GcpFileError> {
    let mut records = Vec::new();

    for (number, line) in BufReader::new(reader).lines().enumerate().skip(1) {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let line_number = number + 1;
        if fields.len() != 6 {
            return Err(GcpFileError::Parse {
                line: line_number,
                message: format!("expected 6 columns, found {}", fields.len()),
            });
        }

        let float = |i: usize| {
            fields[i].parse::<f64>().map_err(|e| GcpFileError::Parse {
                line: line_number,
                message: format!("invalid number '{}': {e}", fields[i]),
            })
        };
        let int = |i: usize| {
            fields[i].parse::<i64>().map_err(|e| GcpFileError::Parse {
                line: line_number,
                message: format!("invalid pixel index '{}': {e}", fields[i]),
            })
        };

        records.push(GcpRecord {
            easting: float(0)?,
            northing: float(1)?,
            elevation: float(2)?,
            pixel_col: int(3)?,
            pixel_row: int(4)?,
            name: fields[5].to_string(),
        });
    }

    Ok(records)
}

pub fn read_gcp_path<P: AsRef<Path>>(path: P) -> Result<Vec<GcpRecord>, GcpFileError> {
    read_gcp_file(std::fs::File::open(path)?)
}
