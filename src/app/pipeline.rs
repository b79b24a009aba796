//! Shared analysis pipeline used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve countries -> fetch both indicators -> join -> correlate -> regress
//!
//! Front-ends then only decide what to print.

use serde::Serialize;

use crate::data::catalog::{self, Country};
use crate::data::{
    Aggregation, CancelToken, DbnomicsClient, FetchOptions, RequestTracker, SampleSource, SeriesSource, aggregate,
};
use crate::domain::{AnalysisConfig, CorrelationResult, Indicator, RegressionResult};
use crate::error::AppError;
use crate::stats::{correlate, regress};

/// All computed outputs of one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// Requested entities, in display order.
    pub countries: Vec<String>,
    pub gdp: Aggregation,
    pub trade: Aggregation,
    pub correlations: Vec<CorrelationResult>,
    /// Trade balance regressed on GDP growth.
    pub regressions: Vec<RegressionResult>,
}

impl AnalysisOutput {
    /// Either indicator came back with no observations at all.
    pub fn has_no_data(&self) -> bool {
        self.gdp.series.is_empty() || self.trade.series.is_empty()
    }
}

/// Pick the series source the config asks for.
pub fn source_from_config(config: &AnalysisConfig) -> Result<Box<dyn SeriesSource>, AppError> {
    if config.offline {
        log::info!("using offline sample source (seed {})", config.seed);
        Ok(Box::new(SampleSource::new(config.seed)))
    } else {
        Ok(Box::new(DbnomicsClient::from_env(config.timeout)?))
    }
}

/// Execute the full pipeline for a one-shot request.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisOutput, AppError> {
    let countries = catalog::resolve(&config.countries)?;
    let source = source_from_config(config)?;
    let session = AnalysisSession::new(
        source,
        FetchOptions {
            max_workers: config.max_workers,
        },
    );
    session.run(&countries)
}

/// Execute the pipeline against an explicit source under `token`.
///
/// Returns exit code 5 if the token is superseded before results are ready.
pub fn run_with_source<S>(
    source: &S,
    countries: &[Country],
    options: &FetchOptions,
    token: &CancelToken,
) -> Result<AnalysisOutput, AppError>
where
    S: SeriesSource + ?Sized,
{
    let names: Vec<String> = countries.iter().map(|c| c.name.to_string()).collect();

    // 1) Fetch both indicators; each aggregation is its own barrier.
    let gdp = aggregate(
        source,
        &catalog::series_requests(countries, Indicator::GdpGrowth),
        Indicator::GdpGrowth.label(),
        options,
        token,
    )?;
    ensure_current(token)?;

    let trade = aggregate(
        source,
        &catalog::series_requests(countries, Indicator::TradeBalance),
        Indicator::TradeBalance.label(),
        options,
        token,
    )?;
    ensure_current(token)?;

    // 2) Statistics over the (entity, date) join.
    let correlations = correlate(&gdp.series, &trade.series, &names);
    let regressions = regress(&gdp.series, &trade.series, &names);
    ensure_current(token)?;

    log::debug!(
        "analysis #{} done: {} gdp / {} trade observations",
        token.generation(),
        gdp.series.len(),
        trade.series.len()
    );

    Ok(AnalysisOutput {
        countries: names,
        gdp,
        trade,
        correlations,
        regressions,
    })
}

fn ensure_current(token: &CancelToken) -> Result<(), AppError> {
    if token.is_cancelled() {
        return Err(AppError::new(5, "Request superseded by a newer selection."));
    }
    Ok(())
}

/// A long-lived pipeline for a consumer whose selection can change while a
/// request is still running.
///
/// Each `run` supersedes the previous one; only the newest request's output is
/// ever published to `latest`.
pub struct AnalysisSession<S> {
    source: S,
    options: FetchOptions,
    tracker: RequestTracker<AnalysisOutput>,
}

impl<S: SeriesSource> AnalysisSession<S> {
    pub fn new(source: S, options: FetchOptions) -> Self {
        Self {
            source,
            options,
            tracker: RequestTracker::new(),
        }
    }

    pub fn run(&self, countries: &[Country]) -> Result<AnalysisOutput, AppError> {
        let token = self.tracker.begin();
        let output = run_with_source(&self.source, countries, &self.options, &token)?;
        if !self.tracker.publish(&token, output.clone()) {
            return Err(AppError::new(5, "Request superseded by a newer selection."));
        }
        Ok(output)
    }

    /// The newest published output, if any.
    pub fn latest(&self) -> Option<AnalysisOutput> {
        self.tracker.latest().map(|(_, output)| output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;

    use crate::data::catalog::CATALOG;
    use crate::data::{FetchStatus, SeriesPoints};
    use crate::domain::{Degeneracy, Estimate};
    use crate::error::DataSourceError;

    fn y(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    fn pick(names: &[&str]) -> Vec<Country> {
        catalog::resolve(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    /// USA: GDP 2020, 2021 and trade 2020, 2021. Japan: GDP 2020 only, no trade.
    struct FixedSource;

    impl SeriesSource for FixedSource {
        fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError> {
            let points = match series_id {
                "IMF/WEO:2024-04/USA.NGDP_RPCH.pcent_change" => vec![(y(2020), Some(1.0)), (y(2021), Some(2.0))],
                "IMF/WEO:2024-04/JPN.NGDP_RPCH.pcent_change" => vec![(y(2020), Some(3.0))],
                "CEPII/CHELEM-TRADE-INDIC/USA.BALGDP.TOTAL.TTGS" => {
                    vec![(y(2020), Some(5.0)), (y(2021), Some(7.0))]
                }
                _ => Vec::new(),
            };
            Ok(points)
        }
    }

    #[test]
    fn end_to_end_with_partial_data() {
        let countries = pick(&["USA", "Japan"]);
        let out = run_with_source(&FixedSource, &countries, &FetchOptions::default(), &CancelToken::detached()).unwrap();

        assert_eq!(out.countries, vec!["USA", "Japan"]);
        assert_eq!(out.gdp.series.len(), 3);
        assert_eq!(out.trade.series.len(), 2);
        assert!(!out.has_no_data());

        let usa = &out.correlations[0];
        assert_eq!(usa.sample_size, 2);
        assert!((usa.coefficient.value().unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            out.correlations[1].coefficient,
            Estimate::Undefined(Degeneracy::InsufficientData { required: 2, available: 0 })
        );

        // Two points cannot support a regression with an intercept.
        assert_eq!(
            out.regressions[0].fit,
            Estimate::Undefined(Degeneracy::InsufficientData { required: 3, available: 2 })
        );
    }

    #[test]
    fn country_without_any_series_is_empty_everywhere() {
        let countries = pick(&["USA", "China"]);
        let out = run_with_source(&FixedSource, &countries, &FetchOptions::default(), &CancelToken::detached()).unwrap();

        for agg in [&out.gdp, &out.trade] {
            let china = agg.outcomes.iter().find(|o| o.entity == "China").unwrap();
            assert_eq!(china.status, FetchStatus::Empty);
            assert!(agg.series.observations().iter().all(|o| o.entity != "China"));
            assert!(agg.failures().next().is_none());
        }

        let corr = out.correlations.iter().find(|r| r.entity == "China").unwrap();
        assert_eq!(corr.sample_size, 0);
        assert_eq!(
            corr.coefficient,
            Estimate::Undefined(Degeneracy::InsufficientData { required: 2, available: 0 })
        );
        let reg = out.regressions.iter().find(|r| r.entity == "China").unwrap();
        assert_eq!(
            reg.fit,
            Estimate::Undefined(Degeneracy::InsufficientData { required: 3, available: 0 })
        );
    }

    #[test]
    fn offline_sample_gives_results_for_whole_catalog() {
        let countries = CATALOG.to_vec();
        let out = run_with_source(
            &SampleSource::new(42),
            &countries,
            &FetchOptions { max_workers: 2 },
            &CancelToken::detached(),
        )
        .unwrap();

        assert_eq!(out.correlations.len(), CATALOG.len());
        assert_eq!(out.regressions.len(), CATALOG.len());
        for r in &out.correlations {
            let c = r.coefficient.value().unwrap();
            assert!((-1.0..=1.0).contains(c), "{}: {c}", r.entity);
            assert!(r.sample_size > 30);
        }
        for r in &out.regressions {
            let fit = r.fit.value().unwrap();
            assert!((0.0..=1.0).contains(&fit.r_squared));
        }
    }

    /// Blocks the first GDP lookup until `release` is set.
    struct GatedSource {
        release: Arc<AtomicBool>,
        first: AtomicBool,
    }

    impl SeriesSource for GatedSource {
        fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError> {
            if self.first.swap(false, Ordering::SeqCst) {
                while !self.release.load(Ordering::SeqCst) {
                    std::thread::sleep(Duration::from_millis(5));
                }
            }
            FixedSource.fetch(series_id)
        }
    }

    #[test]
    fn slow_request_cannot_overwrite_newer_one() {
        let release = Arc::new(AtomicBool::new(false));
        let session = Arc::new(AnalysisSession::new(
            GatedSource {
                release: Arc::clone(&release),
                first: AtomicBool::new(true),
            },
            FetchOptions { max_workers: 1 },
        ));

        let slow = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.run(&pick(&["Japan"])))
        };
        // Let the slow request reach its gated lookup before starting the newer one.
        while session.source.first.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(5));
        }

        let fresh = session.run(&pick(&["USA"])).unwrap();
        release.store(true, Ordering::SeqCst);

        let stale = slow.join().unwrap();
        assert_eq!(stale.unwrap_err().exit_code(), 5);
        assert_eq!(fresh.countries, vec!["USA"]);
        assert_eq!(session.latest().unwrap().countries, vec!["USA"]);
    }
}
