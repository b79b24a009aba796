//! DBnomics API integration for the IMF and CEPII indicator series.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::source::{SeriesPoints, SeriesSource};
use crate::error::{AppError, DataSourceError, DataSourceErrorKind};

const DEFAULT_BASE_URL: &str = "https://api.db.nomics.world/v22";

pub struct DbnomicsClient {
    client: Client,
    base_url: String,
}

impl DbnomicsClient {
    /// Build a client from `.env` / environment, with the given per-request timeout.
    ///
    /// `DBNOMICS_API_URL` overrides the public endpoint (useful for mirrors).
    pub fn from_env(timeout: Duration) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("DBNOMICS_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, timeout)
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn series_url(&self, series_id: &str) -> Result<String, DataSourceError> {
        let (provider, dataset, series) = split_series_id(series_id)
            .ok_or_else(|| DataSourceError::new(series_id, DataSourceErrorKind::InvalidId))?;
        Ok(format!("{}/series/{provider}/{dataset}/{series}", self.base_url))
    }
}

impl SeriesSource for DbnomicsClient {
    fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError> {
        let url = self.series_url(series_id)?;

        let resp = self
            .client
            .get(&url)
            .query(&[("observations", "1"), ("format", "json"), ("metadata", "false")])
            .send()
            .map_err(|e| {
                DataSourceError::new(
                    series_id,
                    DataSourceErrorKind::Transport {
                        timed_out: e.is_timeout(),
                        detail: e.to_string(),
                    },
                )
            })?;

        // 404 means the provider, dataset or series code is unknown.
        if resp.status() == StatusCode::NOT_FOUND {
            log::warn!("series {series_id} not found at provider");
            return Err(DataSourceError::new(series_id, DataSourceErrorKind::InvalidId));
        }
        if !resp.status().is_success() {
            return Err(DataSourceError::new(
                series_id,
                DataSourceErrorKind::Status {
                    code: resp.status().as_u16(),
                },
            ));
        }

        let body = resp.text().map_err(|e| {
            DataSourceError::new(
                series_id,
                DataSourceErrorKind::Transport {
                    timed_out: e.is_timeout(),
                    detail: e.to_string(),
                },
            )
        })?;

        parse_series_body(&body)
            .map_err(|detail| DataSourceError::new(series_id, DataSourceErrorKind::Decode { detail }))
    }
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    series: SeriesPage,
}

#[derive(Debug, Deserialize)]
struct SeriesPage {
    #[serde(default)]
    docs: Vec<SeriesDoc>,
}

#[derive(Debug, Deserialize)]
struct SeriesDoc {
    #[serde(default)]
    period: Vec<String>,
    #[serde(default)]
    period_start_day: Vec<String>,
    #[serde(default)]
    value: Vec<Option<RawValue>>,
}

/// DBnomics encodes missing values as the string `"NA"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

/// Split `provider/dataset/series` into its three parts.
///
/// Only the first two slashes separate; dataset codes may contain `:`.
fn split_series_id(series_id: &str) -> Option<(&str, &str, &str)> {
    let mut parts = series_id.splitn(3, '/');
    let provider = parts.next()?.trim();
    let dataset = parts.next()?.trim();
    let series = parts.next()?.trim();
    if provider.is_empty() || dataset.is_empty() || series.is_empty() {
        return None;
    }
    Some((provider, dataset, series))
}

/// Decode a `/series/...` response body into `(period start, value)` pairs.
fn parse_series_body(body: &str) -> Result<SeriesPoints, String> {
    let resp: SeriesResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let Some(doc) = resp.series.docs.into_iter().next() else {
        return Ok(Vec::new());
    };

    if doc.period.len() != doc.value.len() {
        return Err(format!(
            "period/value length mismatch ({} vs {})",
            doc.period.len(),
            doc.value.len()
        ));
    }
    let use_start_days = doc.period_start_day.len() == doc.period.len();

    let mut out = Vec::with_capacity(doc.period.len());
    for (idx, (period, raw)) in doc.period.iter().zip(doc.value).enumerate() {
        let date = if use_start_days {
            NaiveDate::parse_from_str(&doc.period_start_day[idx], "%Y-%m-%d")
                .map_err(|e| format!("invalid period_start_day '{}': {e}", doc.period_start_day[idx]))?
        } else {
            parse_period(period).ok_or_else(|| format!("unsupported period '{period}'"))?
        };
        out.push((date, raw.and_then(parse_value)));
    }

    Ok(out)
}

fn parse_value(raw: RawValue) -> Option<f64> {
    let v = match raw {
        RawValue::Number(v) => v,
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("NA") || trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
    };
    if v.is_finite() { Some(v) } else { None }
}

/// Map a DBnomics period code to the first day of that period.
///
/// Supports annual (`2020`), semester (`2020-S2`), quarterly (`2020-Q3`),
/// monthly (`2020-07`) and daily (`2020-07-14`) codes.
fn parse_period(period: &str) -> Option<NaiveDate> {
    let period = period.trim();
    if let Ok(date) = NaiveDate::parse_from_str(period, "%Y-%m-%d") {
        return Some(date);
    }

    let (year_part, rest) = match period.split_once('-') {
        Some((y, r)) => (y, Some(r)),
        None => (period, None),
    };
    let year: i32 = year_part.parse().ok()?;

    let month = match rest {
        None => 1,
        Some(r) if r.starts_with('Q') => {
            let q: u32 = r[1..].parse().ok()?;
            if !(1..=4).contains(&q) {
                return None;
            }
            (q - 1) * 3 + 1
        }
        Some(r) if r.starts_with('S') => match &r[1..] {
            "1" => 1,
            "2" => 7,
            _ => return None,
        },
        Some(r) => r.parse().ok()?,
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}
