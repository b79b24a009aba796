//! Fetch one indicator for many entities and stack the results.
//!
//! Lookups run on a small dedicated rayon pool so that a large selection does not
//! hammer the provider. The pool's `install` call is the barrier: the aligned
//! series is only built once every lookup for the indicator has returned.

use rayon::prelude::*;
use serde::Serialize;

use crate::data::cancel::CancelToken;
use crate::data::source::{SeriesPoints, SeriesSource};
use crate::domain::{AlignedSeries, Observation};
use crate::error::{AppError, DataSourceError, DataSourceErrorKind};

/// Default number of concurrent lookups.
pub const DEFAULT_MAX_WORKERS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub max_workers: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// What happened to one entity's lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchStatus {
    Loaded { observations: usize },
    /// The provider had no observations; the entity is left out of the series.
    Empty,
    Failed { error: DataSourceError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityFetch {
    pub entity: String,
    pub series_id: String,
    #[serde(flatten)]
    pub status: FetchStatus,
}

/// Output of aggregating one indicator.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub series: AlignedSeries,
    /// One entry per requested entity, in request order.
    pub outcomes: Vec<EntityFetch>,
}

impl Aggregation {
    pub fn failures(&self) -> impl Iterator<Item = &EntityFetch> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FetchStatus::Failed { .. }))
    }
}

/// Fetch every `(entity, series_id)` pair and concatenate the non-empty results.
///
/// Per-entity failures are recorded in `outcomes` and never abort the others.
/// If all lookups come back empty the series is empty, which is not an error.
pub fn aggregate<S>(
    source: &S,
    requests: &[(String, String)],
    label: &str,
    options: &FetchOptions,
    token: &CancelToken,
) -> Result<Aggregation, AppError>
where
    S: SeriesSource + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.max_workers.max(1))
        .thread_name(|i| format!("gtb-fetch-{i}"))
        .build()
        .map_err(|e| AppError::new(4, format!("Failed to start fetch pool: {e}")))?;

    // Indexed parallel collect keeps request order whatever the completion order.
    let results: Vec<Result<SeriesPoints, DataSourceError>> = pool.install(|| {
        requests
            .par_iter()
            .map(|(entity, series_id)| fetch_one(source, entity, series_id, token))
            .collect()
    });

    let mut observations = Vec::new();
    let mut outcomes = Vec::with_capacity(requests.len());
    for ((entity, series_id), result) in requests.iter().zip(results) {
        let status = match result {
            Ok(points) if points.is_empty() => {
                log::info!("no observations for {entity} ({series_id}) in '{label}'");
                FetchStatus::Empty
            }
            Ok(points) => {
                let n = points.len();
                observations.extend(
                    points
                        .into_iter()
                        .map(|(date, value)| Observation::new(entity.as_str(), date, value)),
                );
                FetchStatus::Loaded { observations: n }
            }
            Err(error) => {
                if !error.is_cancelled() {
                    log::warn!("fetch failed for {entity}: {error}");
                }
                FetchStatus::Failed { error }
            }
        };
        outcomes.push(EntityFetch {
            entity: entity.clone(),
            series_id: series_id.clone(),
            status,
        });
    }

    Ok(Aggregation {
        series: AlignedSeries::from_observations(label, observations),
        outcomes,
    })
}

fn fetch_one<S>(
    source: &S,
    entity: &str,
    series_id: &str,
    token: &CancelToken,
) -> Result<SeriesPoints, DataSourceError>
where
    S: SeriesSource + ?Sized,
{
    if token.is_cancelled() {
        return Err(DataSourceError::new(series_id, DataSourceErrorKind::Cancelled));
    }
    log::debug!("fetching {series_id} for {entity}");
    let result = source.fetch(series_id);
    // A lookup that finished after its request was superseded is discarded.
    if token.is_cancelled() {
        return Err(DataSourceError::new(series_id, DataSourceErrorKind::Cancelled));
    }
    if let Ok(points) = &result {
        log::debug!("fetched {} observations of {series_id}", points.len());
    }
    result
}
