//! Shared value types for the CRUD client.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values that take part in request construction and outcome classification.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{CrudError, ModelName, RequestId};

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// URL prefix and primary-key placement for one registered API.
///
/// Immutable once stored in a [`crate::Registry`]; re-registering the same
/// (app, api name) pair replaces the whole descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Base URL for every model of the API, e.g. `"/api/crud/"`.
    ///
    /// Not validated; the model segment is appended verbatim.
    pub prefix: String,

    /// When `true`, the primary-key parameter is moved out of the query or
    /// body and into the URL path.
    pub pk_in_path: bool,
}

impl EndpointDescriptor {
    /// Creates a descriptor.
    pub fn new(prefix: impl Into<String>, pk_in_path: bool) -> Self {
        Self {
            prefix: prefix.into(),
            pk_in_path,
        }
    }

    /// Returns `<prefix><model lowercased>/`.
    pub fn model_url(&self, model: &ModelName) -> String {
        format!("{}{}/", self.prefix, model.path_segment())
    }
}

// ---------------------------------------------------------------------------
// HTTP exchange
// ---------------------------------------------------------------------------

/// HTTP verbs the client can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Put,
    Delete,
}

impl HttpMethod {
    /// Returns the verb as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Returns `true` for methods whose parameters travel in the query string.
    ///
    /// All other methods send parameters in the request body and carry the
    /// CSRF header.
    pub fn uses_query(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready for an [`crate::HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Target URL, possibly relative to the transport's base URL.
    pub url: String,
    /// Extra headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
    /// Encoded body; `None` for query methods.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Returns the value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The raw response handed back by an [`crate::HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How a response status is routed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// Status 200. Fires the success callback.
    Success,
    /// Status 400, 404 or 500. Fires the failure callback.
    Failure,
    /// Any other status. Fires no callback.
    Unhandled,
}

impl StatusClass {
    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => StatusClass::Success,
            400 | 404 | 500 => StatusClass::Failure,
            _ => StatusClass::Unhandled,
        }
    }
}

/// Result of one completed CRUD call.
///
/// Produced for every response the transport receives, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub request_id: RequestId,
    pub method: HttpMethod,
    /// URL the request was sent to, after parameter encoding.
    pub url: String,
    pub status: u16,
    pub class: StatusClass,
    pub body: String,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        self.class == StatusClass::Success
    }

    /// Decodes the whole response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CrudError> {
        serde_json::from_str(&self.body).map_err(|e| CrudError::InvalidResponse {
            message: e.to_string(),
        })
    }

    /// Decodes the `response` member of the server's JSON envelope.
    ///
    /// Ezi servers wrap every payload as `{"response": ...}`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, CrudError> {
        self.json::<ResponseEnvelope<T>>().map(|e| e.response)
    }
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope<T> {
    response: T,
}

/// Payload returned by a DELETE.
///
/// Deleting a single record yields `{"deleted": true}`; deleting a filtered
/// list also reports how many rows were affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_entries_affected: Option<u64>,
}
