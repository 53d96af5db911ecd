//! Coordinate rasters and reliability mask from projected terrain points
//!
//! Reads the projection engine's point list, interpolates easting, northing,
//! elevation and camera distance onto the image grid, derives the point
//! density and writes the reliability mask. With `--image` the binary
//! viewshed and photo edge layers used for digitizing control points are
//! written too.

use anyhow::Context;
use clap::Parser;
use georef::image_proc::edges::grayscale;
use georef::pipeline::photo_edges;
use georef::run_pipeline;
use georef::shared_args::SharedRasterArgs;
use georef_shared::{ProjectedPoint, Raster, RasterSink};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "georef-mask",
    about = "Interpolates projected points to rasters and builds the reliability mask",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    shared: SharedRasterArgs,

    /// Camera photo; enables the edges_view and edges_image outputs
    #[arg(long)]
    image: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.shared.load_config().context("loading configuration")?;
    let size = args.shared.image_size();
    let points: Vec<_> = args
        .shared
        .load_points()?
        .iter()
        .map(ProjectedPoint::to_correspondence)
        .collect();

    let products = run_pipeline(&points, size, &args.shared.camera, &config)?;

    let mut sink = args.shared.raster_sink()?;
    products.write_products(&mut sink)?;

    if let Some(path) = &args.image {
        let photo = image::open(path).with_context(|| format!("opening {}", path.display()))?;
        let gray = Raster::new(grayscale(&photo), config.nodata);
        if gray.size() != size {
            anyhow::bail!(
                "photo {} is {} but the grid is {size}",
                path.display(),
                gray.size()
            );
        }

        sink.write_raster("edges_view", &products.viewshed_edges(&config.edges))?;
        sink.write_raster("edges_image", &photo_edges(&gray, &config.edges))?;
    }

    println!(
        "Mask keeps {} of {} pixels ({})",
        products.mask.kept_count(),
        size.pixel_count(),
        args.shared.output_dir.display()
    );
    Ok(())
}
