use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("unexpected file contents: {0:?}")]
    UnrecognizedFormat(String),

    #[error("{0} should be preceded by HEADERS")]
    MissingHeader(String),

    #[error("HEADER for {section} describes a different number of columns (expected {expected}, found {found})")]
    ColumnCountMismatch {
        section: String,
        expected: usize,
        found: usize,
    },

    #[error("unsupported key: {0:?}")]
    UnsupportedKey(String),

    #[error("invalid numeric value {value:?} in {field}: {source}")]
    InvalidNumber {
        field: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("invalid status update time {0:?}")]
    InvalidTimestamp(String),

    #[error("{metric} expects {expected} labels, got {found}")]
    LabelArity {
        metric: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("counter {metric} cannot take value {value}")]
    InvalidCounterValue { metric: &'static str, value: f64 },
}

impl ExporterError {
    /// Builds an [`ExporterError::InvalidNumber`] for a field that failed to parse as `f64`.
    pub fn invalid_number(
        field: impl Into<String>,
        value: impl Into<String>,
        source: std::num::ParseFloatError,
    ) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            value: value.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
