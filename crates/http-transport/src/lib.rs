//! Ezi HTTP transport adapter.
//!
//! Implements the [`crud::HttpTransport`] trait over `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL resolution against a base, header and body
//! framing, timeouts, and mapping of `reqwest` failures all live here. The
//! [`crud`] crate sees only [`crud::HttpTransport`].
//!
//! ## Framing
//!
//! - Relative request URLs (e.g. `/api/crud/person/`) are resolved against the
//!   configured base URL; absolute URLs are used as-is.
//! - Bodies are sent as `text/plain; charset=utf-8`.
//! - Every received response is returned, whatever its status. Only failures
//!   to complete the exchange become errors.

mod error;

use std::time::Duration;

use async_trait::async_trait;
use crud::{CrudError, HttpMethod, HttpRequest, HttpResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use tracing::{debug, instrument};

pub use error::TransportError;

/// Content type of encoded request bodies.
pub const BODY_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Options for building a [`ReqwestTransport`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Base against which relative request URLs are resolved.
    pub base_url: Option<String>,
    /// Whole-request timeout. `None` disables it.
    pub timeout: Option<Duration>,
}

/// [`crud::HttpTransport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Builds a transport from `config`.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|base| {
                Url::parse(base).map_err(|source| TransportError::InvalidUrl {
                    url: base.to_string(),
                    source,
                })
            })
            .transpose()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Build)?;

        Ok(Self { client, base_url })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client, base_url: Option<Url>) -> Self {
        Self { client, base_url }
    }

    /// Resolves `url` against the base URL when it is relative.
    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        let invalid = |source| TransportError::InvalidUrl {
            url: url.to_string(),
            source,
        };
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(url).map_err(invalid),
                None => Err(invalid(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(other) => Err(invalid(other)),
        }
    }

    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        let mut builder = self.client.request(to_reqwest_method(request.method), url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, BODY_CONTENT_TYPE).body(body);
        }

        let response = builder.send().await.map_err(TransportError::Request)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::Body)?;
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl crud::HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CrudError> {
        self.send_request(request).await.map_err(CrudError::from)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: Option<&str>) -> ReqwestTransport {
        ReqwestTransport::new(TransportConfig {
            base_url: base.map(str::to_string),
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn relative_urls_resolve_against_base() {
        let t = transport(Some("http://localhost:8000/"));
        assert_eq!(
            t.resolve("/api/crud/person/7?x=5").unwrap().as_str(),
            "http://localhost:8000/api/crud/person/7?x=5"
        );
    }

    #[test]
    fn absolute_urls_ignore_base() {
        let t = transport(Some("http://localhost:8000/"));
        assert_eq!(
            t.resolve("https://other.example/api/").unwrap().as_str(),
            "https://other.example/api/"
        );
    }

    #[test]
    fn relative_url_without_base_is_rejected() {
        let err = transport(None).resolve("/api/crud/").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestTransport::new(TransportConfig {
            base_url: Some("not a url".to_string()),
            timeout: None,
        })
        .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Head), Method::HEAD);
        assert_eq!(to_reqwest_method(HttpMethod::Put), Method::PUT);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), Method::DELETE);
    }
}
