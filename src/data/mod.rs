//! Series retrieval: the source seam, the DBnomics client, the offline sample
//! source, the country catalog and per-indicator aggregation.

pub mod aggregate;
pub mod cancel;
pub mod catalog;
pub mod dbnomics;
pub mod sample;
pub mod source;

pub use aggregate::{Aggregation, EntityFetch, FetchOptions, FetchStatus, aggregate};
pub use cancel::{CancelToken, RequestTracker};
pub use dbnomics::DbnomicsClient;
pub use sample::SampleSource;
pub use source::{SeriesPoints, SeriesSource};
