//! Named markers placed in the digitizing viewer.
//!
//! The viewer shows rasters with x to the right and y up, so a marker at
//! `(x, y)` lies on image column `x` and row `-y`. Markers are placed in
//! pairs that share a name prefix and differ in suffix, for instance
//! `p1_view` / `p1_img` for ground control points or `p1_old` / `p1_real`
//! for correction samples.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use thiserror::Error;

/// Suffixes of a ground control point pair.
pub const GCP_SUFFIXES: (&str, &str) = ("view", "img");
/// Suffixes of a position correction pair.
pub const CORRECTION_SUFFIXES: (&str, &str) = ("old", "real");

#[derive(Error, Debug)]
pub enum MarkerFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Position in viewer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewerPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Viewer position of the image cell `(row, col)`.
    pub fn from_cell(row: f64, col: f64) -> Self {
        Self { x: col, y: -row }
    }

    /// Image cell `(row, col)` under the marker.
    pub fn cell(&self) -> (i64, i64) {
        (-(self.y.round() as i64), self.x.round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub position: ViewerPoint,
}

impl Marker {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            position: ViewerPoint::new(x, y),
        }
    }

    /// Name up to the first `_`, or the whole name.
    pub fn prefix(&self) -> &str {
        self.name.split('_').next().unwrap_or(&self.name)
    }
}

/// Two markers sharing a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPair {
    pub prefix: String,
    pub first: ViewerPoint,
    pub second: ViewerPoint,
}

/// Pair markers named `<prefix>_<first>` and `<prefix>_<second>`.
///
/// A prefix is used only if it occurs exactly twice, once with each full
/// name. Every other prefix is dropped with a warning. Pairs keep the order
/// in which their prefix first appears.
pub fn pair_markers(markers: &[Marker], suffixes: (&str, &str)) -> Vec<MarkerPair> {
    let mut prefixes: Vec<&str> = Vec::new();
    for marker in markers {
        if !prefixes.contains(&marker.prefix()) {
            prefixes.push(marker.prefix());
        }
    }

    let mut pairs = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        if prefix.is_empty() {
            log::warn!("marker names starting with '_' have no prefix, excluded");
            continue;
        }
        let group: Vec<&Marker> = markers.iter().filter(|m| m.prefix() == prefix).collect();
        if group.len() != 2 {
            log::warn!(
                "{prefix}: found {} markers instead of 2, excluded",
                group.len()
            );
            continue;
        }

        let first_name = format!("{prefix}_{}", suffixes.0);
        let second_name = format!("{prefix}_{}", suffixes.1);
        let first = group.iter().find(|m| m.name == first_name);
        let second = group.iter().find(|m| m.name == second_name);

        match (first, second) {
            (Some(first), Some(second)) => pairs.push(MarkerPair {
                prefix: prefix.to_string(),
                first: first.position,
                second: second.position,
            }),
            _ => log::warn!(
                "{prefix}: expected markers {first_name} and {second_name}, excluded"
            ),
        }
    }

    pairs
}

/// Read markers from a text stream with a header line and `NAME X Y` records.
pub fn read_markers<R: Read>(reader: R) -> Result<Vec<Marker>, MarkerFileError> {
    let mut markers = Vec::new();

    for (number, line) in BufReader::new(reader).lines().enumerate().skip(1) {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(MarkerFileError::Parse {
                line: number + 1,
                message: format!("expected NAME X Y, found {} columns", fields.len()),
            });
        }

        let coordinate = |field: &str| {
            field.parse::<f64>().map_err(|e| MarkerFileError::Parse {
                line: number + 1,
                message: format!("invalid coordinate '{field}': {e}"),
            })
        };
        markers.push(Marker::new(fields[0], coordinate(fields[1])?, coordinate(fields[2])?));
    }

    Ok(markers)
}

pub fn read_marker_file<P: AsRef<Path>>(path: P) -> Result<Vec<Marker>, MarkerFileError> {
    read_markers(std::fs::File::open(path)?)
}
