//! `gdp-trade-balance` library crate.
//!
//! The binary (`gtb`) is a thin wrapper around this library so that:
//!
//! - the alignment and statistics engine is testable without spawning processes
//! - a different front-end (dashboard, notebook) can reuse the same pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod stats;
