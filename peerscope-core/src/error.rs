use crate::status::StatusError;
use peerscope_client::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid host address '{0}'")]
    InvalidHost(String),

    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid jitter standard deviation: {0}")]
    InvalidJitter(f64),

    /// Any failure of the remote query, whatever its cause.
    #[error("instance query failed for {host}: {source}")]
    QueryFailed {
        host: String,
        #[source]
        source: QueryError,
    },

    #[error("{0} is already being discovered")]
    AlreadyLoading(String),

    #[error("{0} is not part of the graph")]
    NotFound(String),

    #[error("{0} has not failed, nothing to retry")]
    NotFailed(String),

    /// The node was removed, or re-crawled, while this discovery was in
    /// flight.
    #[error("{0} was removed before its discovery finished")]
    Discarded(String),

    /// The discovery task died before settling; the node was marked failed.
    #[error("discovery of {host} was interrupted: {reason}")]
    Interrupted { host: String, reason: String },

    #[error(transparent)]
    Status(StatusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StatusError> for DiscoveryError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::AlreadyLoading(host) => DiscoveryError::AlreadyLoading(host),
            other => DiscoveryError::Status(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
