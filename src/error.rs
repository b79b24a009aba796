use serde::Serialize;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why a single series lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSourceErrorKind {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    Transport { timed_out: bool, detail: String },
    /// The provider answered with a non-success status.
    Status { code: u16 },
    /// The body could not be decoded into observations.
    Decode { detail: String },
    /// The series id is malformed or unknown to the provider (HTTP 404).
    InvalidId,
    /// The request was superseded before the lookup ran.
    Cancelled,
}

/// A failed lookup of one remote series.
///
/// This is entity-local: the aggregator records it against the entity and keeps
/// going with the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceError {
    pub series_id: String,
    #[serde(flatten)]
    pub kind: DataSourceErrorKind,
}

impl DataSourceError {
    pub fn new(series_id: impl Into<String>, kind: DataSourceErrorKind) -> Self {
        Self {
            series_id: series_id.into(),
            kind,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, DataSourceErrorKind::Cancelled)
    }
}

impl std::fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DataSourceErrorKind::Transport { timed_out: true, .. } => {
                write!(f, "request for series {} timed out", self.series_id)
            }
            DataSourceErrorKind::Transport { detail, .. } => {
                write!(f, "request for series {} failed: {detail}", self.series_id)
            }
            DataSourceErrorKind::Status { code } => {
                write!(f, "request for series {} failed with status {code}", self.series_id)
            }
            DataSourceErrorKind::Decode { detail } => {
                write!(f, "failed to decode series {}: {detail}", self.series_id)
            }
            DataSourceErrorKind::InvalidId => {
                write!(f, "unknown or malformed series id '{}'", self.series_id)
            }
            DataSourceErrorKind::Cancelled => {
                write!(f, "lookup of series {} was cancelled", self.series_id)
            }
        }
    }
}

impl std::error::Error for DataSourceError {}
