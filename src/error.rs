//! Error types surfaced by the library.

use thiserror::Error;

/// The external data source could not deliver usable rows.
///
/// Any of these aborts the computation; no partial metrics are produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed {what} payload: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Errors returned by the metric computation entry points.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("hour must be between 0 and 23, got {0}")]
    InvalidHour(u32),

    #[error("day offset {0} is out of range")]
    DayOutOfRange(i64),
}
