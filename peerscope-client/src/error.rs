use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while querying a remote instance.
///
/// Callers treat every variant as "instance query failed"; the variants
/// only exist so the cause can be logged.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl QueryError {
    /// True when the request never produced a response (DNS, TLS, timeout...).
    pub fn is_transport(&self) -> bool {
        matches!(self, QueryError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
