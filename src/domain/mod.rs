//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - tagged observations and aligned series (`Observation`, `AlignedSeries`)
//! - joined records (`JoinedRecord`)
//! - statistic outputs (`CorrelationResult`, `RegressionResult`, `Estimate`)
//! - run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
