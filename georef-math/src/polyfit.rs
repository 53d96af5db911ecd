//! One-dimensional least-squares polynomial fitting.
//!
//! Abscissae are mapped onto `[-1, 1]` before the normal equations are
//! formed, so high degrees over pixel-sized ranges (thousands of columns)
//! stay well conditioned. The normalized coefficients are what the fit
//! stores; [`Polynomial::coefficients`] expands them back to the raw
//! power basis when a caller needs them.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Errors raised while fitting a polynomial.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolyFitError {
    #[error("length mismatch: {xs} abscissae but {ys} ordinates")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("degree {degree} fit needs at least {required} distinct abscissae, got {got}")]
    InsufficientDistinct {
        degree: usize,
        required: usize,
        got: usize,
    },

    #[error("non-finite sample at index {0}")]
    NonFinite(usize),

    #[error("normal equations are singular")]
    Singular,
}

/// Polynomial `p(x) = Σ a_k · ((x - center) / scale)^k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients in the normalized variable, ascending powers
    normalized: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    /// Polynomial directly from raw ascending power coefficients.
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        Self {
            normalized: coefficients,
            center: 0.0,
            scale: 1.0,
        }
    }

    /// Degree of the polynomial (number of coefficients minus one).
    pub fn degree(&self) -> usize {
        self.normalized.len().saturating_sub(1)
    }

    /// Evaluate at `x` using Horner's scheme in the normalized variable.
    pub fn evaluate(&self, x: f64) -> f64 {
        let u = (x - self.center) / self.scale;
        self.normalized
            .iter()
            .rev()
            .fold(0.0, |acc, &coefficient| acc * u + coefficient)
    }

    /// Raw power-basis coefficients `c_j` with `p(x) = Σ c_j x^j`, ascending.
    pub fn coefficients(&self) -> Vec<f64> {
        let n = self.normalized.len();
        let mut raw = vec![0.0; n];
        let inv_scale = 1.0 / self.scale;

        // ((x - c) / s)^k = s^-k Σ_j C(k, j) x^j (-c)^(k-j)
        for (k, &a_k) in self.normalized.iter().enumerate() {
            let factor = a_k * inv_scale.powi(k as i32);
            let mut binomial = 1.0;
            for j in 0..=k {
                if j > 0 {
                    binomial = binomial * (k - j + 1) as f64 / j as f64;
                }
                raw[j] += factor * binomial * (-self.center).powi((k - j) as i32);
            }
        }

        raw
    }
}

/// Fit a polynomial of the given degree to `(xs, ys)` by least squares.
///
/// The fit is rejected unless there are at least `degree + 1` distinct
/// abscissae; repeated x values add weight but not rank.
///
/// # Errors
/// * `PolyFitError::LengthMismatch` - `xs` and `ys` differ in length
/// * `PolyFitError::NonFinite` - a sample is NaN or infinite
/// * `PolyFitError::InsufficientDistinct` - fewer than `degree + 1` distinct xs
/// * `PolyFitError::Singular` - the normal matrix could not be factorized
pub fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial, PolyFitError> {
    if xs.len() != ys.len() {
        return Err(PolyFitError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }

    if let Some(bad) = xs
        .iter()
        .zip(ys)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(PolyFitError::NonFinite(bad));
    }

    let required = degree + 1;
    let distinct = count_distinct(xs);
    if distinct < required {
        return Err(PolyFitError::InsufficientDistinct {
            degree,
            required,
            got: distinct,
        });
    }

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let center = 0.5 * (min_x + max_x);
    let scale = 0.5 * (max_x - min_x);
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let n = xs.len();
    let vandermonde = DMatrix::from_fn(n, required, |row, col| {
        ((xs[row] - center) / scale).powi(col as i32)
    });
    let rhs = DVector::from_column_slice(ys);

    let normal = vandermonde.transpose() * &vandermonde;
    let projected = vandermonde.transpose() * rhs;

    let cholesky = normal.cholesky().ok_or(PolyFitError::Singular)?;
    let solution = cholesky.solve(&projected);

    if solution.iter().any(|c| !c.is_finite()) {
        return Err(PolyFitError::Singular);
    }

    log::debug!(
        "fitted degree {degree} polynomial over {n} samples ({distinct} distinct abscissae)"
    );

    Ok(Polynomial {
        normalized: solution.iter().copied().collect(),
        center,
        scale,
    })
}

fn count_distinct(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(coefficients: &[f64], xs: &[f64]) -> Vec<f64> {
        let poly = Polynomial::from_coefficients(coefficients.to_vec());
        xs.iter().map(|&x| poly.evaluate(x)).collect()
    }

    #[test]
    fn test_horner_evaluation() {
        let poly = Polynomial::from_coefficients(vec![1.0, -2.0, 3.0]);
        assert_eq!(poly.evaluate(0.0), 1.0);
        assert_eq!(poly.evaluate(2.0), 1.0 - 4.0 + 12.0);
        assert_eq!(poly.degree(), 2);
    }

    #[test]
    fn test_degree_seven_round_trip() {
        let truth = [3.0, -0.8, 0.05, 2.0e-3, -1.0e-4, 4.0e-6, -5.0e-8, 2.0e-10];
        let xs: Vec<f64> = (0..60).map(|i| i as f64 * 1.5).collect();
        let ys = sample(&truth, &xs);

        let fit = fit_polynomial(&xs, &ys, 7).unwrap();
        let recovered = fit.coefficients();

        assert_eq!(recovered.len(), 8);
        for (got, want) in recovered.iter().zip(truth.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-9, max_relative = 1e-5);
        }
        for &x in &xs {
            let expected = Polynomial::from_coefficients(truth.to_vec()).evaluate(x);
            assert_relative_eq!(fit.evaluate(x), expected, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_lower_degree_truth_gives_zero_high_terms() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 10.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 4.0 + 0.5 * x).collect();

        let fit = fit_polynomial(&xs, &ys, 7).unwrap();
        let raw = fit.coefficients();
        assert_relative_eq!(raw[0], 4.0, epsilon = 1e-6);
        assert_relative_eq!(raw[1], 0.5, epsilon = 1e-7);
        for high in &raw[2..] {
            assert!(high.abs() < 1e-8, "unexpected high-order term {high}");
        }
    }

    #[test]
    fn test_repeated_columns_do_not_count() {
        // 10 samples but only 7 distinct columns
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 6.0, 6.0, 0.0];
        let ys = [0.0; 10];
        assert_eq!(
            fit_polynomial(&xs, &ys, 7),
            Err(PolyFitError::InsufficientDistinct {
                degree: 7,
                required: 8,
                got: 7
            })
        );
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            fit_polynomial(&[1.0, 2.0], &[1.0], 1),
            Err(PolyFitError::LengthMismatch { xs: 2, ys: 1 })
        ));
    }

    #[test]
    fn test_non_finite_sample() {
        assert_eq!(
            fit_polynomial(&[0.0, 1.0, f64::NAN], &[0.0, 1.0, 2.0], 1),
            Err(PolyFitError::NonFinite(2))
        );
    }

    #[test]
    fn test_exactly_determined_fit_interpolates() {
        let xs: Vec<f64> = (0..8).map(|i| (i * 100) as f64).collect();
        let ys = [1.0, -3.0, 4.0, 0.5, 2.0, -1.0, 7.0, 0.0];
        let fit = fit_polynomial(&xs, &ys, 7).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(fit.evaluate(*x), *y, epsilon = 1e-6);
        }
    }
}
