//! Per-entity simple linear regression `y = intercept + slope · x`.
//!
//! Point estimates use the closed form:
//!
//! ```text
//! slope     = Sxy / Sxx
//! intercept = ȳ - slope · x̄
//! R²        = 1 - SSR / SST        (0 when SST = 0)
//! ```
//!
//! Inference (standard errors, t statistics, two-sided p-values) uses the
//! residual variance `σ² = SSR / (n - 2)` and Student's t with `n - 2` degrees
//! of freedom.

use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::domain::{AlignedSeries, Axis, Degeneracy, Estimate, RegressionFit, RegressionResult};
use crate::math::{PairMoments, centred, coefficient_std_errors, fitted_values};
use crate::stats::join::{EntityGroup, group_by_entity, inner_join};

/// Number of estimated parameters (intercept and slope).
const N_PARAMS: usize = 2;

/// Smallest sample with at least one residual degree of freedom.
pub const MIN_REGRESSION_N: usize = N_PARAMS + 1;

/// Regress `y_series` on `x_series` per entity.
///
/// Uses the same join and entity set as `correlate`.
pub fn regress(x_series: &AlignedSeries, y_series: &AlignedSeries, requested: &[String]) -> Vec<RegressionResult> {
    let groups = group_by_entity(inner_join(x_series, y_series), requested);
    regress_groups(&groups)
}

pub fn regress_groups(groups: &[EntityGroup]) -> Vec<RegressionResult> {
    groups
        .par_iter()
        .map(|g| RegressionResult {
            entity: g.entity.clone(),
            sample_size: g.len(),
            fit: fit_ols(&g.xs(), &g.ys()),
        })
        .collect()
}

/// Fit `y = intercept + slope · x` by ordinary least squares.
pub fn fit_ols(xs: &[f64], ys: &[f64]) -> Estimate<RegressionFit> {
    let n = xs.len().min(ys.len());
    if n < MIN_REGRESSION_N {
        return Estimate::Undefined(Degeneracy::InsufficientData {
            required: MIN_REGRESSION_N,
            available: n,
        });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let Some(m) = PairMoments::from_pairs(xs, ys) else {
        return Estimate::Undefined(Degeneracy::InsufficientData {
            required: MIN_REGRESSION_N,
            available: 0,
        });
    };
    if m.x_degenerate() {
        return Estimate::Undefined(Degeneracy::DegenerateVariance { axis: Axis::X });
    }
    if !(m.sxx.is_finite() && m.syy.is_finite() && m.sxy.is_finite()) {
        return Estimate::Undefined(Degeneracy::NonFinite);
    }

    let slope = m.sxy / m.sxx;
    let intercept = m.mean_y - slope * m.mean_x;

    // Residuals around the centred line avoid cancellation when x is far from zero.
    let fitted = fitted_values(&centred(xs), m.mean_y, slope);
    let ssr: f64 = ys.iter().zip(fitted.iter()).map(|(y, f)| (y - f).powi(2)).sum();
    let sst = if m.y_constant { 0.0 } else { m.syy };

    let r_squared = if sst > 0.0 {
        (1.0 - ssr / sst).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let df = n - N_PARAMS;
    let dff = df as f64;
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / dff;

    let sigma2 = ssr / dff;
    let Some((std_err_intercept, std_err_slope)) = coefficient_std_errors(xs, sigma2) else {
        return Estimate::Undefined(Degeneracy::NonFinite);
    };

    let t_slope = t_statistic(slope, std_err_slope);
    let t_intercept = t_statistic(intercept, std_err_intercept);

    Estimate::Value(RegressionFit {
        slope,
        intercept,
        r_squared,
        adj_r_squared,
        std_err_slope,
        std_err_intercept,
        t_slope,
        t_intercept,
        p_value_slope: two_sided_p_value(t_slope, df),
        p_value_intercept: two_sided_p_value(t_intercept, df),
        residual_std_err: sigma2.sqrt(),
        degrees_of_freedom: df,
    })
}

/// `coef / se`, with a perfect fit (`se = 0`) mapped to `±∞` (or 0 for a zero coefficient).
fn t_statistic(coef: f64, se: f64) -> f64 {
    if se > 0.0 {
        coef / se
    } else if coef == 0.0 {
        0.0
    } else {
        f64::INFINITY.copysign(coef)
    }
}

/// `P(|T| ≥ |t|)` for `T ~ t(df)`.
fn two_sided_p_value(t: f64, df: usize) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    if !t.is_finite() {
        return f64::NAN;
    }
    if t == 0.0 {
        return 1.0;
    }
    match StudentsT::new(0.0, 1.0, df as f64) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
