//! Input/output helpers.
//!
//! - result exports (JSON/CSV) (`export`)

pub mod export;

pub use export::*;
