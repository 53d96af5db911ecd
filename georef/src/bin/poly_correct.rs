//! Polynomial correction of projected pixel positions
//!
//! Fits column and row offsets to `<name>_old` / `<name>_real` marker pairs,
//! shifts every projected point accordingly, writes the corrected point file
//! and reruns the raster pipeline on it.

use anyhow::Context;
use clap::Parser;
use georef::correction::{samples_from_markers, PolynomialCorrection};
use georef::markers::read_marker_file;
use georef::run_pipeline;
use georef::shared_args::SharedRasterArgs;
use georef_shared::{write_projected, ProjectedPoint};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "poly-correct",
    about = "Corrects projected point positions from _old/_real marker pairs",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    shared: SharedRasterArgs,

    /// Marker file (header + NAME X Y, viewer coordinates)
    #[arg(long)]
    markers: PathBuf,

    /// Where to write the corrected point file
    #[arg(long, default_value = "points_corrected.txt")]
    corrected_points: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.shared.load_config().context("loading configuration")?;
    let markers = read_marker_file(&args.markers)
        .with_context(|| format!("reading markers from {}", args.markers.display()))?;

    let samples = samples_from_markers(&markers);
    let correction = PolynomialCorrection::fit(&samples)
        .with_context(|| format!("fitting correction to {} marker pairs", samples.len()))?;
    log::debug!(
        "column offset coefficients {:?}",
        correction.col_offset().coefficients()
    );
    log::debug!(
        "row offset coefficients {:?}",
        correction.row_offset().coefficients()
    );

    let corrected = correction.apply(&args.shared.load_points()?);
    write_projected(
        BufWriter::new(File::create(&args.corrected_points)?),
        &corrected,
    )?;

    let points: Vec<_> = corrected
        .iter()
        .map(ProjectedPoint::to_correspondence)
        .collect();
    let products = run_pipeline(
        &points,
        args.shared.image_size(),
        &args.shared.camera,
        &config,
    )?;
    products.write_products(&mut args.shared.raster_sink()?)?;

    println!(
        "Corrected {} points from {} samples; mask keeps {} pixels",
        corrected.len(),
        samples.len(),
        products.mask.kept_count()
    );
    Ok(())
}
