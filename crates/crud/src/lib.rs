//! Core of the ezi CRUD client.
//!
//! This crate contains the endpoint registry, request parameters and their two
//! wire encodings, CSRF cookie handling, status classification, and the
//! [`CrudClient`] facade. HTTP itself sits behind the [`HttpTransport`] port;
//! infrastructure crates implement it, this crate never performs I/O.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype names (`AppName`, `ApiName`, `ModelName`) and `RequestId` |
//! | [`types`] | Endpoint descriptors, HTTP request/response, outcomes |
//! | [`params`] | Insertion-ordered, optionally typed request parameters |
//! | [`encoding`] | Query-string and body encoders |
//! | [`cookie`] | Cookie parsing and the `CookieSource` port |
//! | [`registry`] | Endpoint registry and JSON client configuration |
//! | [`transport`] | `HttpTransport` port, request building, callback routing |
//! | [`client`] | The `CrudClient` facade |
//! | [`errors`] | `CrudError` and `RetryPolicy` |
//!
//! ## Example
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register_default(AppName::new("shop").unwrap(), "/api/crud/");
//!
//! let client = CrudClient::new(registry, transport, Arc::new(CookieJar::new(cookies)));
//! let outcome = client
//!     .list_or_get(&app, &ModelName::new("Person").unwrap(), Params::new().int("age", 21), CallOptions::new())
//!     .await?;
//! ```

pub mod client;
pub mod cookie;
pub mod encoding;
pub mod errors;
pub mod identifiers;
pub mod params;
pub mod registry;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use client::{CallOptions, CrudClient, CSRF_FIELD};
pub use cookie::{read_cookie, CookieJar, CookieSource, CSRF_COOKIE_NAME};
pub use encoding::{encode_body, encode_query};
pub use errors::{CrudError, RetryPolicy};
pub use identifiers::{ApiName, AppName, ModelName, RequestId, DEFAULT_API_NAME};
pub use params::{is_primary_key, ParamType, Params};
pub use registry::{ClientConfig, EndpointConfig, Registry};
pub use transport::{
    attach_csrf_header, build_request, Callback, Callbacks, HttpTransport, Transport, CSRF_HEADER,
};
pub use types::{
    CallOutcome, DeleteSummary, EndpointDescriptor, HttpMethod, HttpRequest, HttpResponse,
    StatusClass,
};
