//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the fetch, alignment and statistics stages
//! - exported to JSON for a downstream renderer
//! - rendered as terminal tables by `report`

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The two macroeconomic indicators compared by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    GdpGrowth,
    TradeBalance,
}

impl Indicator {
    pub const ALL: [Indicator; 2] = [Indicator::GdpGrowth, Indicator::TradeBalance];

    /// Value-column label used for the aligned series.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::GdpGrowth => "GDP Growth Rate (%)",
            Indicator::TradeBalance => "Trade Balance (% of GDP)",
        }
    }
}

/// One `(entity, date, value)` data point of one indicator.
///
/// `value` is `None` when the provider reports the period but has no number for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub entity: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(entity: impl Into<String>, date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            entity: entity.into(),
            date,
            value,
        }
    }
}

/// Observations of one indicator across several entities.
///
/// No two observations share an `(entity, date)` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    label: String,
    observations: Vec<Observation>,
}

impl AlignedSeries {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            observations: Vec::new(),
        }
    }

    /// Build a series, keeping the first observation for each `(entity, date)`.
    pub fn from_observations(label: impl Into<String>, observations: Vec<Observation>) -> Self {
        let label = label.into();
        let mut seen: HashSet<(String, NaiveDate)> = HashSet::with_capacity(observations.len());
        let mut kept = Vec::with_capacity(observations.len());
        for obs in observations {
            if seen.insert((obs.entity.clone(), obs.date)) {
                kept.push(obs);
            } else {
                log::warn!(
                    "dropping duplicate observation for {} on {} in '{label}'",
                    obs.entity,
                    obs.date
                );
            }
        }
        Self {
            label,
            observations: kept,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct entities in first-seen order.
    pub fn entities(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .filter(|o| seen.insert(o.entity.as_str()))
            .map(|o| o.entity.as_str())
            .collect()
    }

    /// Observations of one entity, sorted by date.
    pub fn for_entity(&self, entity: &str) -> Vec<&Observation> {
        let mut out: Vec<&Observation> = self.observations.iter().filter(|o| o.entity == entity).collect();
        out.sort_by_key(|o| o.date);
        out
    }
}

/// One `(entity, date)` key present in both series, with both values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub entity: String,
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Why a statistic could not be computed for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Degeneracy {
    /// Fewer joined observations than the statistic needs.
    InsufficientData { required: usize, available: usize },
    /// An axis the statistic divides by has zero variance.
    DegenerateVariance { axis: Axis },
    /// Sums over the sample overflowed; the statistic would be `inf`/`NaN`.
    NonFinite,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degeneracy::InsufficientData { required, available } => {
                write!(f, "insufficient data (n={available}, need {required})")
            }
            Degeneracy::DegenerateVariance { axis } => {
                let name = match axis {
                    Axis::X => "x",
                    Axis::Y => "y",
                };
                write!(f, "zero variance in {name}")
            }
            Degeneracy::NonFinite => write!(f, "non-finite intermediate result"),
        }
    }
}

/// A statistic that is either computed or explicitly undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Estimate<T> {
    Value(T),
    Undefined(Degeneracy),
}

impl<T> Estimate<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Estimate::Value(v) => Some(v),
            Estimate::Undefined(_) => None,
        }
    }

    pub fn degeneracy(&self) -> Option<Degeneracy> {
        match self {
            Estimate::Value(_) => None,
            Estimate::Undefined(d) => Some(*d),
        }
    }
}

/// Pearson correlation of one entity's joined observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub entity: String,
    pub sample_size: usize,
    pub coefficient: Estimate<f64>,
}

/// OLS fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub std_err_slope: f64,
    pub std_err_intercept: f64,
    pub t_slope: f64,
    pub t_intercept: f64,
    pub p_value_slope: f64,
    pub p_value_intercept: f64,
    /// Square root of the residual variance `SSR / (n - 2)`.
    pub residual_std_err: f64,
    pub degrees_of_freedom: usize,
}

/// Per-entity regression outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub entity: String,
    pub sample_size: usize,
    pub fit: Estimate<RegressionFit>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Catalog names to analyse, in display order.
    pub countries: Vec<String>,
    /// Use the deterministic synthetic source instead of the remote provider.
    pub offline: bool,
    /// Seed for the synthetic source.
    pub seed: u64,
    /// Upper bound on concurrent series lookups.
    pub max_workers: usize,
    /// Per-lookup timeout.
    pub timeout: Duration,
    pub export_json: Option<PathBuf>,
}
