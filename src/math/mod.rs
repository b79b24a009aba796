//! Mathematical utilities: paired-sample moments and OLS coefficient covariance.

pub mod moments;
pub mod ols;

pub use moments::*;
pub use ols::*;
