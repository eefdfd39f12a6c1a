//! Transport-level failures and their mapping into [`crud::CrudError`].

use crud::{CrudError, RetryPolicy};
use thiserror::Error;

/// Failures that prevent an HTTP exchange from completing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request URL (or configured base URL) could not be parsed.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The underlying `reqwest` client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request could not be sent or no response arrived.
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response arrived but its body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl TransportError {
    /// Timeouts and connection failures may succeed on a second attempt;
    /// everything else fails the same way again.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            TransportError::Request(e) | TransportError::Body(e)
                if e.is_timeout() || e.is_connect() =>
            {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl From<TransportError> for CrudError {
    fn from(err: TransportError) -> Self {
        CrudError::Transport {
            retry: err.retry_policy(),
            message: err.to_string(),
        }
    }
}
