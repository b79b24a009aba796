//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the run configuration (flags over environment over defaults)
//! - runs the fetch/correlate/regress pipeline
//! - prints reports
//! - writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::cli::{AnalyzeArgs, Command, RunArgs};
use crate::data::aggregate::DEFAULT_MAX_WORKERS;
use crate::domain::AnalysisConfig;
use crate::error::AppError;

pub mod pipeline;

/// Default per-lookup timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Entry point for the `gtb` binary.
pub fn run() -> Result<(), AppError> {
    // `gtb` and `gtb --offline` behave like `gtb analyze ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Series(args) => handle_run(&args, OutputMode::Series),
        Command::Correlate(args) => handle_run(&args, OutputMode::Correlation),
        Command::Regress(args) => handle_run(&args, OutputMode::Regression),
        Command::Analyze(args) => handle_analyze(args),
        Command::Sources => {
            println!("{}", crate::report::format_sources());
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Series,
    Correlation,
    Regression,
    Full,
}

fn handle_run(args: &RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = config_from_args(args, None);
    let output = pipeline::run_analysis(&config)?;
    print_output(&output, mode)
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.run, args.export_json.clone());
    let output = pipeline::run_analysis(&config)?;

    // Exports happen even when one indicator is empty; the file records that.
    if let Some(path) = &config.export_json {
        crate::io::write_analysis_json(path, &output)?;
        log::info!("wrote {}", path.display());
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_observations_csv(path, &output)?;
        log::info!("wrote {}", path.display());
    }

    print_output(&output, OutputMode::Full)
}

fn print_output(output: &pipeline::AnalysisOutput, mode: OutputMode) -> Result<(), AppError> {
    println!("{}", crate::report::format_fetch_outcomes(&output.gdp, &output.trade));

    if output.has_no_data() {
        return Err(AppError::new(3, "No data available for the selected countries."));
    }

    if matches!(mode, OutputMode::Series | OutputMode::Full) {
        println!("{}", crate::report::format_series_table(&output.gdp.series));
        println!("{}", crate::report::format_series_table(&output.trade.series));
    }
    if matches!(mode, OutputMode::Correlation | OutputMode::Full) {
        println!("{}", crate::report::format_correlations(&output.correlations));
    }
    if matches!(mode, OutputMode::Regression | OutputMode::Full) {
        println!("{}", crate::report::format_regressions(&output.regressions));
    }
    Ok(())
}

/// Build the run configuration.
///
/// Worker count and timeout come from flags, then `GTB_MAX_WORKERS` /
/// `GTB_TIMEOUT_SECS` (`.env` is honoured), then defaults.
pub fn config_from_args(args: &RunArgs, export_json: Option<std::path::PathBuf>) -> AnalysisConfig {
    dotenvy::dotenv().ok();
    let max_workers = args
        .workers
        .or_else(|| env_parse("GTB_MAX_WORKERS"))
        .unwrap_or(DEFAULT_MAX_WORKERS)
        .max(1);
    let timeout_secs = args
        .timeout_secs
        .or_else(|| env_parse("GTB_TIMEOUT_SECS"))
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .max(1);

    AnalysisConfig {
        countries: args.countries.clone(),
        offline: args.offline,
        seed: args.seed,
        max_workers,
        timeout: Duration::from_secs(timeout_secs),
        export_json,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring unparseable {key}={raw}");
            None
        }
    }
}

/// Rewrite argv so `gtb` defaults to `gtb analyze`.
///
/// Rules:
/// - `gtb`                      -> `gtb analyze`
/// - `gtb --offline ...`        -> `gtb analyze --offline ...`
/// - `gtb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
    }
    argv
}
