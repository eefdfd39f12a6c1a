//! Error and retry-policy types for the CRUD client.
//!
//! [`CrudError`] covers conditions that stop a call before an HTTP outcome
//! exists: an endpoint that was never registered, or a transport that could
//! not complete the exchange. HTTP-level failures (400, 404, 500, ...) are not
//! errors; they are reported through [`crate::CallOutcome`].
//!
//! [`RetryPolicy`] is attached to transport failures so callers can decide
//! whether re-issuing the call is sensible. The client itself never retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ApiName, AppName};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether a transport failure is safe to retry and, if so, after what delay.
///
/// - `Retryable`: connection resets, timeouts.
/// - `NonRetryable`: malformed URLs, requests the transport refused to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The call may be issued again.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// Re-issuing the same call will fail the same way.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

/// Errors that prevent a CRUD call from producing an outcome.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum CrudError {
    /// No endpoint is registered for the (app, api name) pair.
    ///
    /// Produced by [`crate::Registry::lookup`] before any network activity.
    #[error("No endpoint registered for app '{app}' and api '{api_name}'")]
    EndpointNotFound {
        /// Application that was looked up.
        app: AppName,
        /// API name that was looked up.
        api_name: ApiName,
    },

    /// The transport could not complete the HTTP exchange.
    ///
    /// Carries no status code: a response was never received.
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
        /// Whether the call may be re-issued.
        retry: RetryPolicy,
    },

    /// A response body could not be decoded into the requested type.
    #[error("Invalid response body: {message}")]
    InvalidResponse {
        /// Decoder error message.
        message: String,
    },

    /// The client configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl CrudError {
    /// Returns the retry policy for this error.
    ///
    /// Only transport failures can be retryable; every other variant would
    /// fail identically on a second attempt.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            CrudError::Transport { retry, .. } => retry.clone(),
            _ => RetryPolicy::NonRetryable,
        }
    }
}
