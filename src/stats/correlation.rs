//! Per-entity Pearson correlation.

use rayon::prelude::*;

use crate::domain::{AlignedSeries, Axis, CorrelationResult, Degeneracy, Estimate};
use crate::math::PairMoments;
use crate::stats::join::{EntityGroup, group_by_entity, inner_join};

/// Pearson's r needs at least two points.
pub const MIN_CORRELATION_N: usize = 2;

/// Correlate two aligned series per entity.
///
/// Every entity in `requested` appears in the output, even when it has no joined
/// records; entities with joined records but not requested are appended.
pub fn correlate(a: &AlignedSeries, b: &AlignedSeries, requested: &[String]) -> Vec<CorrelationResult> {
    let groups = group_by_entity(inner_join(a, b), requested);
    correlate_groups(&groups)
}

pub fn correlate_groups(groups: &[EntityGroup]) -> Vec<CorrelationResult> {
    groups
        .par_iter()
        .map(|g| CorrelationResult {
            entity: g.entity.clone(),
            sample_size: g.len(),
            coefficient: pearson(&g.xs(), &g.ys()),
        })
        .collect()
}

/// Pearson correlation `cov(x, y) / (σx σy)`, clamped to `[-1, 1]`.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Estimate<f64> {
    let n = xs.len().min(ys.len());
    if n < MIN_CORRELATION_N {
        return Estimate::Undefined(Degeneracy::InsufficientData {
            required: MIN_CORRELATION_N,
            available: n,
        });
    }
    let Some(m) = PairMoments::from_pairs(xs, ys) else {
        return Estimate::Undefined(Degeneracy::InsufficientData {
            required: MIN_CORRELATION_N,
            available: 0,
        });
    };
    if m.x_degenerate() {
        return Estimate::Undefined(Degeneracy::DegenerateVariance { axis: Axis::X });
    }
    if m.y_degenerate() {
        return Estimate::Undefined(Degeneracy::DegenerateVariance { axis: Axis::Y });
    }
    if !(m.sxx.is_finite() && m.syy.is_finite() && m.sxy.is_finite()) {
        return Estimate::Undefined(Degeneracy::NonFinite);
    }

    let r = m.sxy / (m.sxx.sqrt() * m.syy.sqrt());
    Estimate::Value(r.clamp(-1.0, 1.0))
}
