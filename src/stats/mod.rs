//! Alignment and statistics: the `(entity, date)` join, per-entity Pearson
//! correlation and per-entity OLS regression.
//!
//! Everything here is pure and synchronous; no function performs I/O.

pub mod correlation;
pub mod join;
pub mod regression;

pub use correlation::{correlate, pearson};
pub use join::{EntityGroup, group_by_entity, inner_join};
pub use regression::{fit_ols, regress};
