//! Ground control points from paired viewer markers.
//!
//! The `_view` marker of a pair sits on the projected terrain, where the
//! coordinate rasters give the map position. The `_img` marker sits on the
//! same feature in the photo and gives the image cell.

use georef_shared::{GcpRecord, Raster};

use crate::markers::{pair_markers, Marker, MarkerPair, GCP_SUFFIXES};

/// Easting, northing and elevation rasters of one projection run.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateRasters<'a> {
    pub east: &'a Raster,
    pub north: &'a Raster,
    pub elevation: &'a Raster,
}

/// GCP records for every valid `_view` / `_img` pair among `markers`.
pub fn extract_gcps(markers: &[Marker], rasters: CoordinateRasters<'_>) -> Vec<GcpRecord> {
    let pairs = pair_markers(markers, GCP_SUFFIXES);
    let records = build_gcp_records(&pairs, rasters);
    log::info!(
        "{} ground control points from {} markers",
        records.len(),
        markers.len()
    );
    records
}

/// Sample the coordinate rasters under each pair's view marker.
///
/// Pairs whose view marker lies outside the rasters, or on a cell that is
/// nodata in any of them, are dropped with a warning.
pub fn build_gcp_records(pairs: &[MarkerPair], rasters: CoordinateRasters<'_>) -> Vec<GcpRecord> {
    let size = rasters.east.size();
    pairs
        .iter()
        .filter_map(|pair| {
            let (row, col) = pair.first.cell();
            if !size.contains(row, col) {
                log::warn!(
                    "{}: view marker at cell ({row}, {col}) is outside the {size} raster, excluded",
                    pair.prefix
                );
                return None;
            }
            let (row, col) = (row as usize, col as usize);
            if rasters.east.is_nodata(row, col)
                || rasters.north.is_nodata(row, col)
                || rasters.elevation.is_nodata(row, col)
            {
                log::warn!(
                    "{}: view marker at cell ({row}, {col}) has no terrain coordinates, excluded",
                    pair.prefix
                );
                return None;
            }
            let (pixel_row, pixel_col) = pair.second.cell();

            Some(GcpRecord {
                easting: f64::from(rasters.east.get(row, col)),
                northing: f64::from(rasters.north.get(row, col)),
                elevation: f64::from(rasters.elevation.get(row, col)),
                pixel_col,
                pixel_row,
                name: pair.prefix.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::{InterpolationMethod, ScatteredGrid};
    use georef_shared::{write_gcp_file, ImageSize, DEFAULT_NODATA};
    use ndarray::Array2;

    fn rasters() -> (Raster, Raster, Raster) {
        let east = Array2::from_shape_fn((10, 10), |(r, c)| 1000.0 + (r * 10 + c) as f32);
        let north = Array2::from_shape_fn((10, 10), |(r, c)| 5000.0 - (r * 10 + c) as f32);
        let elevation = Array2::from_elem((10, 10), 812.0f32);
        (
            Raster::new(east, DEFAULT_NODATA),
            Raster::new(north, DEFAULT_NODATA),
            Raster::new(elevation, DEFAULT_NODATA),
        )
    }

    #[test]
    fn test_samples_view_cell_and_converts_image_cell() {
        let (east, north, elevation) = rasters();
        let markers = vec![
            Marker::new("hut_view", 3.2, -4.7),
            Marker::new("hut_img", 120.6, -80.4),
        ];
        let records = extract_gcps(
            &markers,
            CoordinateRasters {
                east: &east,
                north: &north,
                elevation: &elevation,
            },
        );

        assert_eq!(records.len(), 1);
        let gcp = &records[0];
        // view cell is row 5, col 3
        assert_eq!(gcp.easting, 1053.0);
        assert_eq!(gcp.northing, 4947.0);
        assert_eq!(gcp.elevation, 812.0);
        assert_eq!(gcp.pixel_col, 121);
        assert_eq!(gcp.pixel_row, 80);
        assert_eq!(gcp.name, "hut");
    }

    #[test]
    fn test_only_paired_names_are_written() {
        let (east, north, elevation) = rasters();
        let markers = vec![
            Marker::new("a_view", 1.0, -1.0),
            Marker::new("a_img", 2.0, -2.0),
            Marker::new("b_view", 3.0, -3.0),
        ];
        let records = extract_gcps(
            &markers,
            CoordinateRasters {
                east: &east,
                north: &north,
                elevation: &elevation,
            },
        );

        let mut buffer = Vec::new();
        write_gcp_file(&mut buffer, &records).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().ends_with(" a"));
    }

    #[test]
    fn test_view_marker_outside_raster_is_dropped() {
        let (east, north, elevation) = rasters();
        let markers = vec![
            Marker::new("far_view", 30.0, -2.0),
            Marker::new("far_img", 1.0, -1.0),
            Marker::new("up_view", 2.0, 1.0),
            Marker::new("up_img", 1.0, -1.0),
        ];
        let records = extract_gcps(
            &markers,
            CoordinateRasters {
                east: &east,
                north: &north,
                elevation: &elevation,
            },
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_view_marker_over_sky_is_dropped() {
        // Linear mode leaves everything above the terrain hull as nodata
        let points = vec![[0.0, 5.0], [9.0, 5.0], [0.0, 9.0], [9.0, 9.0]];
        let grid = ScatteredGrid::new(&points, ImageSize::from_width_height(10, 10), DEFAULT_NODATA)
            .unwrap();
        let layer = |values: [f64; 4]| grid.interpolate(&values, InterpolationMethod::Linear).unwrap();
        let east = layer([100.0, 200.0, 100.0, 200.0]);
        let north = layer([50.0, 50.0, 10.0, 10.0]);
        let elevation = layer([900.0, 900.0, 800.0, 800.0]);

        let markers = vec![
            Marker::new("sky_view", 4.0, -1.0),
            Marker::new("sky_img", 4.0, -1.0),
            Marker::new("slope_view", 4.0, -7.0),
            Marker::new("slope_img", 40.0, -70.0),
        ];
        let records = extract_gcps(
            &markers,
            CoordinateRasters {
                east: &east,
                north: &north,
                elevation: &elevation,
            },
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "slope");
        assert!(records[0].easting > 100.0 && records[0].easting < 200.0);
    }

    #[test]
    fn test_nodata_in_any_layer_drops_the_pair() {
        let (east, north, mut elevation) = rasters();
        let mut values = elevation.into_values();
        values[[5, 3]] = DEFAULT_NODATA;
        elevation = Raster::new(values, DEFAULT_NODATA);

        let markers = vec![
            Marker::new("hut_view", 3.0, -5.0),
            Marker::new("hut_img", 3.0, -5.0),
        ];
        let records = extract_gcps(
            &markers,
            CoordinateRasters {
                east: &east,
                north: &north,
                elevation: &elevation,
            },
        );
        assert!(records.is_empty());
    }
}
