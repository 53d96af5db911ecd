//! Column-indexed polynomial correction of projected pixel positions.
//!
//! Residuals between where points were projected (`_old` markers) and where
//! they really are in the photo (`_real` markers) are modelled as two
//! polynomials of the projected column: one for the column shift and one
//! for the row shift. Shifts are measured in viewer coordinates, where y
//! points up, so the row offset is subtracted from image rows.

use georef_math::{fit_polynomial, PolyFitError, Polynomial};
use georef_shared::ProjectedPoint;
use thiserror::Error;

use crate::markers::{pair_markers, Marker, CORRECTION_SUFFIXES};

/// Degree of both correction polynomials.
pub const CORRECTION_DEGREE: usize = 7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("correction needs samples at {required} distinct columns, got {got}")]
    InsufficientSamples { required: usize, got: usize },

    #[error("correction fit is singular")]
    Singular,

    #[error("non-finite correction sample at index {0}")]
    NonFinite(usize),
}

impl From<PolyFitError> for CorrectionError {
    fn from(error: PolyFitError) -> Self {
        match error {
            PolyFitError::InsufficientDistinct { required, got, .. } => {
                CorrectionError::InsufficientSamples { required, got }
            }
            PolyFitError::NonFinite(index) => CorrectionError::NonFinite(index),
            PolyFitError::LengthMismatch { .. } | PolyFitError::Singular => {
                CorrectionError::Singular
            }
        }
    }
}

/// One observed residual, in viewer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionSample {
    /// Column of the projected (old) position
    pub old_col: f64,
    /// `real.x - old.x`
    pub delta_col: f64,
    /// `real.y - old.y`
    pub delta_row: f64,
}

/// Correction samples from every valid `_old` / `_real` marker pair.
pub fn samples_from_markers(markers: &[Marker]) -> Vec<CorrectionSample> {
    pair_markers(markers, CORRECTION_SUFFIXES)
        .into_iter()
        .map(|pair| CorrectionSample {
            old_col: pair.first.x,
            delta_col: pair.second.x - pair.first.x,
            delta_row: pair.second.y - pair.first.y,
        })
        .collect()
}

/// Fitted column and row offset polynomials.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialCorrection {
    col_offset: Polynomial,
    row_offset: Polynomial,
}

impl PolynomialCorrection {
    /// Fit degree-7 offsets by least squares over `samples`.
    ///
    /// # Errors
    /// * `CorrectionError::InsufficientSamples` - fewer than 8 distinct columns
    /// * `CorrectionError::NonFinite` - a sample holds NaN or infinity
    /// * `CorrectionError::Singular` - the normal equations cannot be solved
    pub fn fit(samples: &[CorrectionSample]) -> Result<Self, CorrectionError> {
        let cols: Vec<f64> = samples.iter().map(|s| s.old_col).collect();
        let delta_cols: Vec<f64> = samples.iter().map(|s| s.delta_col).collect();
        let delta_rows: Vec<f64> = samples.iter().map(|s| s.delta_row).collect();

        let col_offset = fit_polynomial(&cols, &delta_cols, CORRECTION_DEGREE)?;
        let row_offset = fit_polynomial(&cols, &delta_rows, CORRECTION_DEGREE)?;

        log::info!("fitted position correction from {} samples", samples.len());
        Ok(Self {
            col_offset,
            row_offset,
        })
    }

    pub fn col_offset(&self) -> &Polynomial {
        &self.col_offset
    }

    pub fn row_offset(&self) -> &Polynomial {
        &self.row_offset
    }

    /// Corrected `(row, col)` of an image position.
    pub fn correct(&self, row: f64, col: f64) -> (f64, f64) {
        (
            row - self.row_offset.evaluate(col),
            col + self.col_offset.evaluate(col),
        )
    }

    /// Points with corrected pixel positions; map coordinates are unchanged.
    pub fn apply(&self, points: &[ProjectedPoint]) -> Vec<ProjectedPoint> {
        points
            .iter()
            .map(|p| {
                let (row, col) = self.correct(p.row, p.col);
                ProjectedPoint { row, col, ..*p }
            })
            .collect()
    }
}
