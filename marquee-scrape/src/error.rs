//! Error types for marquee-scrape
//!
//! Failures are contained at the smallest unit. Transport, fetch and
//! extraction errors degrade a single record; only [`SinkError`] fails a run.

use thiserror::Error;

/// Transport-level failure of a single HTTP attempt
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Could not establish a connection
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Response body could not be read or decoded
    #[error("Body read failed: {0}")]
    Body(String),

    /// Anything else reported by the HTTP stack
    #[error("Transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Why the last fetch attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    RateLimited,
    HttpStatus(u16),
    Transport(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::RateLimited => write!(f, "rate limited (HTTP 429)"),
            FailureReason::HttpStatus(status) => write!(f, "HTTP {}", status),
            FailureReason::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

/// Fetch produced no content
///
/// Not fatal: callers treat it as "enrichment unavailable" and move on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No content for {url} after {attempts} attempts (last failure: {last})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: FailureReason,
    },
}

impl FetchError {
    /// Reason of the final failed attempt
    pub fn last_reason(&self) -> &FailureReason {
        match self {
            FetchError::RetriesExhausted { last, .. } => last,
        }
    }
}

/// Field extraction from a fetched document failed
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Output could not be written
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("No data to save")]
    NoData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
