//! Coefficient covariance for the two-parameter OLS model `y = β0 + β1·x`.
//!
//! The point estimates have a closed form (see `stats::regression`); what needs
//! linear algebra is the sampling covariance of `β`:
//!
//! ```text
//! Cov(β) = σ² (XᵀX)⁻¹,   X = [1 x]
//! ```
//!
//! whose diagonal gives the standard errors reported next to each coefficient.
//!
//! `XᵀX` on raw `x` is ill-conditioned once `x` sits far from zero, so the
//! covariance is computed for centred `x` and mapped back with
//! `β0 = β0ᶜ - x̄·β1ᶜ`.

use nalgebra::{DMatrix, DVector};

/// Build the `[1 x]` design matrix.
pub fn design_matrix(xs: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(xs.len(), 2, |r, c| if c == 0 { 1.0 } else { xs[r] })
}

/// `x - x̄` for every element.
pub fn centred(xs: &[f64]) -> Vec<f64> {
    if xs.is_empty() {
        return Vec::new();
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|x| x - mean).collect()
}

/// Standard errors `(intercept, slope)` for residual variance `sigma2`.
///
/// Returns `None` if `XᵀX` is singular (constant or empty `x`) or the result
/// is not finite.
pub fn coefficient_std_errors(xs: &[f64], sigma2: f64) -> Option<(f64, f64)> {
    if xs.len() < 2 || !(sigma2.is_finite() && sigma2 >= 0.0) {
        return None;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let xc = design_matrix(&centred(xs));
    let cov_centred = (xc.transpose() * &xc).try_inverse()? * sigma2;

    let back = DMatrix::from_row_slice(2, 2, &[1.0, -mean, 0.0, 1.0]);
    let cov = &back * cov_centred * back.transpose();

    let se0 = cov[(0, 0)].max(0.0).sqrt();
    let se1 = cov[(1, 1)].max(0.0).sqrt();
    if se0.is_finite() && se1.is_finite() {
        Some((se0, se1))
    } else {
        None
    }
}

/// Fitted values `Xβ` for `β = (intercept, slope)`.
pub fn fitted_values(xs: &[f64], intercept: f64, slope: f64) -> DVector<f64> {
    design_matrix(xs) * DVector::from_row_slice(&[intercept, slope])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_errors_match_closed_form() {
        // For simple regression: se(β1)² = σ²/Sxx, se(β0)² = σ²(1/n + x̄²/Sxx).
        let xs = [1.0, 2.0, 3.0, 4.0];
        let sigma2 = 0.5;
        let (se0, se1) = coefficient_std_errors(&xs, sigma2).unwrap();

        let sxx = 5.0;
        let mean = 2.5;
        assert!((se1 - (sigma2 / sxx).sqrt()).abs() < 1e-10);
        assert!((se0 - (sigma2 * (0.25 + mean * mean / sxx)).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn std_errors_stay_accurate_far_from_zero() {
        let xs: Vec<f64> = (0..5).map(|i| 1e8 + i as f64).collect();
        let sigma2 = 0.8;
        let (se0, se1) = coefficient_std_errors(&xs, sigma2).unwrap();

        let sxx = 10.0;
        let mean = 1e8 + 2.0;
        assert!((se1 - (sigma2 / sxx).sqrt()).abs() < 1e-9, "se1 = {se1}");
        let expected_se0 = (sigma2 * (0.2 + mean * mean / sxx)).sqrt();
        assert!(((se0 - expected_se0) / expected_se0).abs() < 1e-9, "se0 = {se0}");
    }

    #[test]
    fn centred_sums_to_zero() {
        let c = centred(&[1.0, 2.0, 6.0]);
        assert_eq!(c, vec![-2.0, -1.0, 3.0]);
        assert!(centred(&[]).is_empty());
    }

    #[test]
    fn constant_x_is_singular() {
        assert!(coefficient_std_errors(&[2.0, 2.0, 2.0], 1.0).is_none());
    }

    #[test]
    fn fitted_values_apply_line() {
        let fit = fitted_values(&[0.0, 1.0, 2.0], 2.0, 3.0);
        assert_eq!(fit.as_slice(), &[2.0, 5.0, 8.0]);
    }
}
