//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fetch/statistics code stays clean and testable
//! - output changes are localized

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::data::catalog::{CATALOG, SOURCES};
use crate::data::{Aggregation, FetchStatus};
use crate::domain::{AlignedSeries, CorrelationResult, Estimate, Indicator, RegressionResult};

const ENTITY_WIDTH: usize = 10;

/// Header plus one line per indicator summarizing the lookups, then any failures.
pub fn format_fetch_outcomes(gdp: &Aggregation, trade: &Aggregation) -> String {
    let mut out = String::new();
    out.push_str("=== gtb - GDP Growth vs. Trade Balance (DBnomics) ===\n");

    for agg in [gdp, trade] {
        let mut loaded = 0;
        let mut empty = 0;
        let mut failed = 0;
        for o in &agg.outcomes {
            match o.status {
                FetchStatus::Loaded { .. } => loaded += 1,
                FetchStatus::Empty => empty += 1,
                FetchStatus::Failed { .. } => failed += 1,
            }
        }
        out.push_str(&format!(
            "{}: {} observations | loaded={loaded} empty={empty} failed={failed}\n",
            agg.series.label(),
            agg.series.len(),
        ));
    }

    for agg in [gdp, trade] {
        for f in agg.failures() {
            if let FetchStatus::Failed { error } = &f.status {
                out.push_str(&format!("  ! {}: {error}\n", f.entity));
            }
        }
    }

    out
}

/// Pivot a series into a `date x entity` table.
///
/// Annual series (every date on January 1st) are labelled by year.
pub fn format_series_table(series: &AlignedSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}:\n", series.label()));
    if series.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let entities = series.entities();
    let annual = series
        .observations()
        .iter()
        .all(|o| o.date.month() == 1 && o.date.day() == 1);

    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, entity) in entities.iter().enumerate() {
        for o in series.for_entity(entity) {
            let row = rows.entry(o.date).or_insert_with(|| vec![None; entities.len()]);
            row[col] = o.value;
        }
    }

    let mut header = format!("{:<10}", "date");
    let mut rule = format!("{:-<10}", "");
    for e in &entities {
        header.push_str(&format!(" {:>ENTITY_WIDTH$}", truncate(e, ENTITY_WIDTH)));
        rule.push_str(&format!(" {:-<ENTITY_WIDTH$}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (date, values) in rows {
        let label = if annual {
            date.year().to_string()
        } else {
            date.to_string()
        };
        let mut line = format!("{label:<10}");
        for v in values {
            line.push_str(&format!(" {:>ENTITY_WIDTH$}", fmt_opt(v)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Correlation table followed by a short interpretation guide.
pub fn format_correlations(results: &[CorrelationResult]) -> String {
    let mut out = String::new();
    out.push_str("Correlation: GDP growth rate (X) vs. trade balance, % of GDP (Y), Pearson's r\n");
    out.push_str(&format!("{:<ENTITY_WIDTH$} {:>5} {:>8}\n", "country", "n", "r"));
    out.push_str(&format!("{:-<ENTITY_WIDTH$} {:-<5} {:-<8}\n", "", "", ""));

    for r in results {
        let value = match &r.coefficient {
            Estimate::Value(c) => format!("{c:>8.2}"),
            Estimate::Undefined(reason) => format!("{:>8}  ({reason})", "-"),
        };
        out.push_str(&format!(
            "{:<ENTITY_WIDTH$} {:>5} {value}\n",
            truncate(&r.entity, ENTITY_WIDTH),
            r.sample_size
        ));
    }

    out.push_str("\nInterpretation:\n");
    out.push_str("- 0.5 to 1.0: higher GDP growth goes with a larger trade surplus relative to GDP.\n");
    out.push_str("- -0.5 to -1.0: higher GDP growth goes with a larger trade deficit relative to GDP.\n");
    out.push_str("- around 0: no strong linear relationship.\n");
    out
}

/// One summary block per entity: coefficients, standard errors, t and p-values.
pub fn format_regressions(results: &[RegressionResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Regression: {} on {} (OLS)\n",
        Indicator::TradeBalance.label(),
        Indicator::GdpGrowth.label()
    ));

    for r in results {
        out.push('\n');
        out.push_str(&format!("[{}] n={}\n", r.entity, r.sample_size));
        let fit = match &r.fit {
            Estimate::Value(fit) => fit,
            Estimate::Undefined(reason) => {
                out.push_str(&format!("  not estimated: {reason}\n"));
                continue;
            }
        };

        out.push_str(&format!(
            "  R-squared: {:.3}  Adj. R-squared: {:.3}  Residual std. err: {:.3} (df={})\n",
            fit.r_squared, fit.adj_r_squared, fit.residual_std_err, fit.degrees_of_freedom
        ));
        out.push_str(&format!(
            "  {:<12} {:>10} {:>10} {:>10} {:>8}\n",
            "", "coef", "std err", "t", "P>|t|"
        ));
        out.push_str(&format!(
            "  {:<12} {:>10.4} {:>10.4} {:>10} {:>8.3}\n",
            "const",
            fit.intercept,
            fit.std_err_intercept,
            fmt_t(fit.t_intercept),
            fit.p_value_intercept
        ));
        out.push_str(&format!(
            "  {:<12} {:>10.4} {:>10.4} {:>10} {:>8.3}\n",
            "gdp_growth",
            fit.slope,
            fit.std_err_slope,
            fmt_t(fit.t_slope),
            fit.p_value_slope
        ));
    }

    out
}

/// Data sources and the series id of every catalog country.
pub fn format_sources() -> String {
    let mut out = String::new();
    out.push_str("Data (via DBnomics, https://db.nomics.world):\n");
    for s in SOURCES {
        out.push_str(&format!("- {}: {} <{}>\n", s.indicator.label(), s.dataset, s.url));
    }
    out.push_str("\nSeries:\n");
    for c in CATALOG {
        out.push_str(&format!("{}:\n", c.name));
        for ind in Indicator::ALL {
            out.push_str(&format!("  {}\n", c.series_id(ind)));
        }
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}

fn fmt_t(t: f64) -> String {
    if t.is_infinite() {
        if t > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{t:.3}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EntityFetch;
    use crate::domain::{Degeneracy, Observation};
    use crate::error::{DataSourceError, DataSourceErrorKind};
    use crate::stats::{correlate, regress};

    fn y(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    #[test]
    fn series_table_pivots_by_year() {
        let s = AlignedSeries::from_observations(
            "GDP Growth Rate (%)",
            vec![
                Observation::new("USA", y(2021), Some(5.8)),
                Observation::new("USA", y(2020), Some(-2.2)),
                Observation::new("Germany", y(2020), None),
            ],
        );
        let table = format_series_table(&s);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "GDP Growth Rate (%):");
        assert!(lines[1].contains("USA") && lines[1].contains("Germany"));
        assert!(lines[3].starts_with("2020") && lines[3].contains("-2.20") && lines[3].ends_with('-'));
        assert!(lines[4].starts_with("2021") && lines[4].contains("5.80"));
    }

    #[test]
    fn correlation_table_marks_undefined_entities() {
        let a = AlignedSeries::from_observations(
            "a",
            vec![Observation::new("A", y(2020), Some(1.0)), Observation::new("A", y(2021), Some(2.0))],
        );
        let results = correlate(&a, &a, &["A".to_string(), "B".to_string()]);
        let text = format_correlations(&results);
        assert!(text.contains("1.00"));
        let b_line = text.lines().find(|l| l.starts_with('B')).unwrap();
        assert!(b_line.contains(&Degeneracy::InsufficientData { required: 2, available: 0 }.to_string()));
    }

    #[test]
    fn regression_summary_lists_coefficients() {
        let x = AlignedSeries::from_observations(
            "x",
            (0..5).map(|i| Observation::new("UK", y(2015 + i), Some(i as f64))).collect(),
        );
        let yv = AlignedSeries::from_observations(
            "y",
            (0..5)
                .map(|i| Observation::new("UK", y(2015 + i), Some(2.0 * i as f64 + 3.0 + if i % 2 == 0 { 0.1 } else { -0.1 })))
                .collect(),
        );
        let text = format_regressions(&regress(&x, &yv, &["UK".to_string(), "France".to_string()]));
        assert!(text.contains("[UK] n=5"));
        assert!(text.contains("const"));
        assert!(text.contains("gdp_growth"));
        assert!(text.contains("[France] n=0"));
        assert!(text.contains("not estimated"));
    }

    #[test]
    fn fetch_outcomes_list_failures() {
        let gdp = Aggregation {
            series: AlignedSeries::empty(Indicator::GdpGrowth.label()),
            outcomes: vec![EntityFetch {
                entity: "Japan".to_string(),
                series_id: "IMF/WEO:2024-04/JPN.NGDP_RPCH.pcent_change".to_string(),
                status: FetchStatus::Failed {
                    error: DataSourceError::new("IMF/WEO:2024-04/JPN.NGDP_RPCH.pcent_change", DataSourceErrorKind::Status { code: 502 }),
                },
            }],
        };
        let trade = Aggregation {
            series: AlignedSeries::empty(Indicator::TradeBalance.label()),
            outcomes: Vec::new(),
        };
        let text = format_fetch_outcomes(&gdp, &trade);
        assert!(text.contains("failed=1"));
        assert!(text.contains("! Japan"));
        assert!(text.contains("502"));
    }

    #[test]
    fn sources_cover_catalog() {
        let text = format_sources();
        for c in CATALOG {
            assert!(text.contains(c.name));
        }
        assert!(text.contains("CEPII/CHELEM-TRADE-INDIC"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Germany", 10), "Germany");
        assert_eq!(truncate("United Kingdom", 6), "Unite.");
    }
}
