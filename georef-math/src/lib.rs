//! Numerical building blocks for terrain georeferencing.
//!
//! - [`polyfit`]: least-squares polynomials with normalized abscissae
//! - [`nearest`]: exact nearest-point queries over 2D point sets

pub mod nearest;
pub mod polyfit;

pub use nearest::{Locatable2d, NearestHit, PointIndex};
pub use polyfit::{fit_polynomial, PolyFitError, Polynomial};
