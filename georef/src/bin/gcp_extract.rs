//! Ground control point file from digitized marker pairs
//!
//! Markers named `<name>_view` (on the viewshed edges) and `<name>_img` (on
//! the photo) are paired; the map coordinates under each view marker are
//! read from the coordinate rasters written by `georef-mask`.

use anyhow::Context;
use clap::Parser;
use georef::gcp::{extract_gcps, CoordinateRasters};
use georef::markers::read_marker_file;
use georef_shared::{read_geotiff, write_gcp_path, Raster};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "gcp-extract",
    about = "Writes a GCP file from paired _view/_img markers",
    long_about = None
)]
struct Args {
    /// Marker file (header + NAME X Y, viewer coordinates)
    #[arg(long)]
    markers: PathBuf,

    /// Directory holding east_raster.tif, north_raster.tif and alt_raster.tif
    #[arg(long, default_value = "georef_output")]
    rasters: PathBuf,

    /// GCP file to write
    #[arg(long, default_value = "gcp.txt")]
    output: PathBuf,
}

fn load_raster(directory: &Path, name: &str) -> anyhow::Result<Raster> {
    let path = directory.join(format!("{name}.tif"));
    let (raster, _) =
        read_geotiff(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(raster)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let markers = read_marker_file(&args.markers)
        .with_context(|| format!("reading markers from {}", args.markers.display()))?;

    let east = load_raster(&args.rasters, "east_raster")?;
    let north = load_raster(&args.rasters, "north_raster")?;
    let elevation = load_raster(&args.rasters, "alt_raster")?;

    let records = extract_gcps(
        &markers,
        CoordinateRasters {
            east: &east,
            north: &north,
            elevation: &elevation,
        },
    );

    write_gcp_path(&args.output, &records)?;
    println!(
        "Wrote {} ground control points to {}",
        records.len(),
        args.output.display()
    );
    Ok(())
}
