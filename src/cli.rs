//! Command-line parsing for the GDP growth / trade balance analyser.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch and statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "gtb",
    version,
    about = "GDP growth vs. trade balance: per-country correlation and regression (DBnomics)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the GDP growth and trade balance series per country.
    Series(RunArgs),
    /// Print Pearson correlations per country.
    Correlate(RunArgs),
    /// Print regression summaries (trade balance on GDP growth) per country.
    Regress(RunArgs),
    /// Series, correlations and regressions, with optional exports.
    Analyze(AnalyzeArgs),
    /// List the data sources and series ids behind each indicator.
    Sources,
}

/// Options shared by every analysis subcommand.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Countries to analyse (repeat or comma-separate). Defaults to the whole catalog.
    #[arg(short = 'c', long = "country", value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Use deterministic synthetic series instead of the DBnomics API.
    #[arg(long)]
    pub offline: bool,

    /// Seed for `--offline` series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Maximum concurrent series lookups (env: GTB_MAX_WORKERS).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-lookup timeout in seconds (env: GTB_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Export the full analysis (series, fetch outcomes, statistics) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export both aligned series to CSV (long format).
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}
