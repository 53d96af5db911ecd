//! Raster processing stages
//!
//! Interpolation and the distance field turn points into rasters; window
//! operators, edge layers and masks work purely on rasters.

pub mod distance_field;
pub mod edges;
pub mod interpolate;
pub mod mask;
pub mod thresholding;
pub mod window;

pub use distance_field::{distance_field, DistanceFieldConfig, DistanceFieldError};
pub use edges::{image_edges, viewshed_edges, DistanceLayers, EdgeConfig};
pub use interpolate::{InterpolationError, InterpolationMethod, ScatteredGrid};
pub use mask::{build_mask, column_scan_mask, MaskConfig, MaskStrategy};
pub use window::HalfWindow;
