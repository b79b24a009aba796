//! Reporting utilities: fetch summaries, series tables, correlation and
//! regression summaries, and the data-source listing.

mod format;

pub use format::*;
