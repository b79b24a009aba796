//! The seam between the pipeline and whatever serves series observations.

use chrono::NaiveDate;

use crate::error::DataSourceError;

/// Raw observations of one series: `(period start, value)`.
pub type SeriesPoints = Vec<(NaiveDate, Option<f64>)>;

/// Looks up one remote series by its opaque id.
///
/// An empty `Ok` means the provider has no observations for the series; that is
/// a valid outcome, not a failure.
pub trait SeriesSource: Send + Sync {
    fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for &S {
    fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError> {
        (**self).fetch(series_id)
    }
}

impl<S: SeriesSource + ?Sized> SeriesSource for Box<S> {
    fn fetch(&self, series_id: &str) -> Result<SeriesPoints, DataSourceError> {
        (**self).fetch(series_id)
    }
}
