//! Deterministic synthetic series for offline runs.
//!
//! Each country gets a latent annual GDP-growth path drawn from a seeded normal
//! distribution. The trade-balance series for the same country is a noisy linear
//! function of that path, so the correlation/regression stages have a real signal
//! to find. Both series are keyed by the same ids the remote provider uses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::source::{SeriesPoints, SeriesSource};
use crate::error::{DataSourceError, DataSourceErrorKind};

/// GDP growth series cover WEO's history; trade balance series stop earlier.
const GDP_YEARS: (i32, i32) = (1980, 2023);
const TRADE_YEARS: (i32, i32) = (1967, 2021);

/// Share of periods reported without a value.
const MISSING_PROB: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesKind {
    Gdp,
    Trade,
}

/// Offline stand-in for the remote provider.
#[derive(Debug, Clone)]
pub struct SampleSource {
    seed: u64,
}

impl SampleSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SeriesSource for SampleSource {
    fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError> {
        let (kind, iso3) = classify(series_id)
            .ok_or_else(|| DataSourceError::new(series_id, DataSourceErrorKind::InvalidId))?;
        let Some(kind) = kind else {
            log::debug!("sample source has no dataset for {series_id}");
            return Ok(Vec::new());
        };

        let profile = CountryProfile::for_iso3(iso3);
        let gdp = latent_gdp_path(self.seed, iso3, &profile)
            .map_err(|detail| DataSourceError::new(series_id, DataSourceErrorKind::Decode { detail }))?;

        let (first, last) = match kind {
            SeriesKind::Gdp => GDP_YEARS,
            SeriesKind::Trade => TRADE_YEARS,
        };

        let mut rng = StdRng::seed_from_u64(hash_seed(self.seed, series_id));
        let noise = Normal::new(0.0, profile.trade_noise)
            .map_err(|e| DataSourceError::new(series_id, DataSourceErrorKind::Decode { detail: e.to_string() }))?;

        let mut out = Vec::with_capacity((last - first + 1) as usize);
        for (year, growth) in gdp.into_iter().filter(|(y, _)| (first..=last).contains(y)) {
            let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) else {
                continue;
            };
            let value = match kind {
                SeriesKind::Gdp => growth,
                SeriesKind::Trade => profile.trade_level + profile.trade_beta * growth + noise.sample(&mut rng),
            };
            let missing = rng.r#gen::<f64>() < MISSING_PROB;
            out.push((date, if missing { None } else { Some(round2(value)) }));
        }
        Ok(out)
    }
}

/// Stylised per-country parameters (rough orders of magnitude, not estimates).
struct CountryProfile {
    growth_mean: f64,
    growth_sd: f64,
    trade_level: f64,
    trade_beta: f64,
    trade_noise: f64,
}

impl CountryProfile {
    fn for_iso3(iso3: &str) -> Self {
        let (growth_mean, growth_sd, trade_level, trade_beta) = match iso3 {
            "USA" => (2.6, 2.0, -3.5, -0.35),
            "CHN" => (8.5, 3.0, 1.0, 0.25),
            "JPN" => (1.8, 2.3, 1.2, 0.20),
            "GBR" => (2.0, 2.2, -1.8, -0.30),
            "FRA" => (1.7, 1.6, -0.8, -0.15),
            "DEU" => (1.6, 2.1, 3.5, 0.40),
            _ => (2.5, 2.0, 0.0, 0.0),
        };
        Self {
            growth_mean,
            growth_sd,
            trade_level,
            trade_beta,
            trade_noise: 1.0,
        }
    }
}

/// Annual growth for every year either series may cover.
fn latent_gdp_path(seed: u64, iso3: &str, profile: &CountryProfile) -> Result<Vec<(i32, f64)>, String> {
    let mut rng = StdRng::seed_from_u64(hash_seed(seed, iso3));
    let normal = Normal::new(profile.growth_mean, profile.growth_sd).map_err(|e| e.to_string())?;
    let first = GDP_YEARS.0.min(TRADE_YEARS.0);
    let last = GDP_YEARS.1.max(TRADE_YEARS.1);
    Ok((first..=last).map(|year| (year, round2(normal.sample(&mut rng)))).collect())
}

/// Split a series id into its indicator kind and country code.
///
/// `None` means the id is malformed; `Some((None, _))` means the dataset is unknown.
fn classify(series_id: &str) -> Option<(Option<SeriesKind>, &str)> {
    let mut parts = series_id.splitn(3, '/');
    let provider = parts.next()?;
    let dataset = parts.next()?;
    let series = parts.next()?;
    let iso3 = series.split('.').next().filter(|s| !s.is_empty())?;

    let kind = match (provider, dataset) {
        ("IMF", d) if d.starts_with("WEO") => Some(SeriesKind::Gdp),
        ("CEPII", "CHELEM-TRADE-INDIC") => Some(SeriesKind::Trade),
        _ => None,
    };
    Some((kind, iso3))
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
