//! Request dispatch and status-based callback routing.
//!
//! [`HttpTransport`] is the port an infrastructure crate implements to put
//! bytes on the wire. [`Transport`] sits on top of it: it encodes parameters
//! for the chosen method, attaches the CSRF header, sends exactly one request,
//! and routes the classified outcome to the caller's callbacks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cookie::{read_cookie, CookieSource, CSRF_COOKIE_NAME};
use crate::encoding::{encode_body, encode_query};
use crate::{
    CallOutcome, CrudError, HttpMethod, HttpRequest, HttpResponse, Params, RequestId, StatusClass,
};

/// Header carrying the CSRF token on non-query requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Sends one HTTP request and returns whatever response arrives.
///
/// Implementations report only transport-level failures as errors; every
/// received response, whatever its status, is `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CrudError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CrudError> {
        (**self).send(request).await
    }
}

/// Callback invoked with the outcome of a call.
pub type Callback = Box<dyn FnOnce(&CallOutcome) + Send + 'static>;

/// Optional success and failure callbacks for one call.
#[derive(Default)]
pub struct Callbacks {
    on_success: Option<Callback>,
    on_failure: Option<Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs on status 200.
    pub fn on_success(mut self, f: impl FnOnce(&CallOutcome) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Runs on status 400, 404 or 500.
    pub fn on_failure(mut self, f: impl FnOnce(&CallOutcome) + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Invokes at most one callback, chosen by the outcome's class.
    pub fn dispatch(self, outcome: &CallOutcome) {
        let callback = match outcome.class {
            StatusClass::Success => self.on_success,
            StatusClass::Failure => self.on_failure,
            StatusClass::Unhandled => None,
        };
        if let Some(callback) = callback {
            callback(outcome);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Builds the request for `method`: query-encoded URL for GET/HEAD, otherwise
/// a body with the pk (if relocated) appended to the URL as `<pk>/`.
pub fn build_request(url: &str, method: HttpMethod, params: &Params, pk_in_path: bool) -> HttpRequest {
    if method.uses_query() {
        return HttpRequest {
            method,
            url: format!("{url}{}", encode_query(params, pk_in_path)),
            headers: Vec::new(),
            body: None,
        };
    }

    let mut target = url.to_string();
    if pk_in_path {
        if let Some(pk) = params.primary_key() {
            target.push_str(pk);
            target.push('/');
        }
    }
    HttpRequest {
        method,
        url: target,
        headers: Vec::new(),
        body: Some(encode_body(params, pk_in_path)),
    }
}

/// Adds the CSRF header to a non-query request. Query requests are left
/// untouched; a missing token is logged and the request goes out without it.
pub fn attach_csrf_header(request: &mut HttpRequest, token: Option<&str>) {
    if request.method.uses_query() {
        return;
    }
    match token {
        Some(token) => request
            .headers
            .push((CSRF_HEADER.to_string(), token.to_string())),
        None => warn!(
            cookie = CSRF_COOKIE_NAME,
            "CSRF cookie not set; sending request without token"
        ),
    }
}

/// Encodes, sends, classifies, and dispatches single calls.
#[derive(Debug, Clone)]
pub struct Transport<H, C> {
    http: H,
    cookies: C,
}

impl<H: HttpTransport, C: CookieSource> Transport<H, C> {
    pub fn new(http: H, cookies: C) -> Self {
        Self { http, cookies }
    }

    /// Returns the current CSRF token, if the cookie is set.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookies
            .cookie_string()
            .and_then(|cookies| read_cookie(&cookies, CSRF_COOKIE_NAME))
    }

    /// Issues one request and routes its outcome.
    ///
    /// The cookie is read once, and only for non-query methods. Resolves with
    /// the outcome for every received status; callbacks fire only for
    /// [`StatusClass::Success`] and [`StatusClass::Failure`].
    pub async fn call(
        &self,
        request_id: RequestId,
        url: &str,
        method: HttpMethod,
        params: &Params,
        callbacks: Callbacks,
        pk_in_path: bool,
    ) -> Result<CallOutcome, CrudError> {
        let mut request = build_request(url, method, params, pk_in_path);
        if !method.uses_query() {
            attach_csrf_header(&mut request, self.csrf_token().as_deref());
        }
        self.send_and_route(request_id, request, callbacks).await
    }

    /// Sends an already built request, classifies the response and runs the
    /// matching callback.
    pub async fn send_and_route(
        &self,
        request_id: RequestId,
        request: HttpRequest,
        callbacks: Callbacks,
    ) -> Result<CallOutcome, CrudError> {
        debug!(url = %request.url, "sending request");
        let method = request.method;
        let url = request.url.clone();
        let response = self.http.send(request).await?;

        let outcome = CallOutcome {
            request_id,
            method,
            url,
            status: response.status,
            class: StatusClass::from_status(response.status),
            body: response.body,
        };
        info!(status = outcome.status, class = ?outcome.class, "request completed");

        callbacks.dispatch(&outcome);
        Ok(outcome)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::testing::RecordingTransport;
    use super::*;
    use crate::cookie::CookieJar;

    fn transport(
        status: u16,
        cookies: &str,
    ) -> (Arc<RecordingTransport>, Transport<Arc<RecordingTransport>, CookieJar>) {
        let http = RecordingTransport::replying(status, "{}");
        (http.clone(), Transport::new(http, CookieJar::new(cookies)))
    }

    struct Counters {
        success: Arc<AtomicUsize>,
        failure: Arc<AtomicUsize>,
    }

    fn counting_callbacks() -> (Counters, Callbacks) {
        let success = Arc::new(AtomicUsize::new(0));
        let failure = Arc::new(AtomicUsize::new(0));
        let (s, f) = (success.clone(), failure.clone());
        let callbacks = Callbacks::new()
            .on_success(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_failure(move |_| {
                f.fetch_add(1, Ordering::SeqCst);
            });
        (Counters { success, failure }, callbacks)
    }

    async fn run(status: u16) -> (CallOutcome, Counters) {
        let (_, transport) = transport(status, "");
        let (counters, callbacks) = counting_callbacks();
        let outcome = transport
            .call(
                RequestId::new_random(),
                "/api/crud/person/",
                HttpMethod::Get,
                &Params::new(),
                callbacks,
                false,
            )
            .await
            .unwrap();
        (outcome, counters)
    }

    #[tokio::test]
    async fn status_200_fires_only_success() {
        let (outcome, counters) = run(200).await;
        assert_eq!(outcome.class, StatusClass::Success);
        assert_eq!(counters.success.load(Ordering::SeqCst), 1);
        assert_eq!(counters.failure.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn status_404_fires_only_failure() {
        let (outcome, counters) = run(404).await;
        assert_eq!(outcome.class, StatusClass::Failure);
        assert_eq!(counters.success.load(Ordering::SeqCst), 0);
        assert_eq!(counters.failure.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn status_201_fires_nothing_but_still_resolves() {
        let (outcome, counters) = run(201).await;
        assert_eq!(outcome.class, StatusClass::Unhandled);
        assert_eq!(outcome.status, 201);
        assert_eq!(counters.success.load(Ordering::SeqCst), 0);
        assert_eq!(counters.failure.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_appends_query_and_sends_no_body_or_token() {
        let (http, transport) = transport(200, "csrftoken=tok");
        let params = Params::new().with("pk", 7).with("x", 5);
        transport
            .call(
                RequestId::new_random(),
                "/api/crud/person/",
                HttpMethod::Get,
                &params,
                Callbacks::new(),
                true,
            )
            .await
            .unwrap();

        let sent = &http.requests()[0];
        assert_eq!(sent.url, "/api/crud/person/7?x=5");
        assert_eq!(sent.body, None);
        assert_eq!(sent.header(CSRF_HEADER), None);
    }

    #[tokio::test]
    async fn delete_moves_pk_into_path_and_attaches_token() {
        let (http, transport) = transport(200, "sessionid=s; csrftoken=tok%21");
        let params = Params::new().pk(3).str("name", "Ada");
        let outcome = transport
            .call(
                RequestId::new_random(),
                "/api/crud/person/",
                HttpMethod::Delete,
                &params,
                Callbacks::new(),
                true,
            )
            .await
            .unwrap();

        let sent = &http.requests()[0];
        assert_eq!(sent.url, "/api/crud/person/3/");
        assert_eq!(outcome.url, "/api/crud/person/3/");
        assert_eq!(sent.body.as_deref(), Some("[name::str]:=:[Ada]"));
        assert_eq!(sent.header(CSRF_HEADER), Some("tok!"));
    }

    #[tokio::test]
    async fn missing_cookie_sends_no_header() {
        let (http, transport) = transport(200, "");
        transport
            .call(
                RequestId::new_random(),
                "/api/crud/person/",
                HttpMethod::Put,
                &Params::new().with("a", 1),
                Callbacks::new(),
                false,
            )
            .await
            .unwrap();

        let sent = &http.requests()[0];
        assert!(sent.headers.is_empty());
        assert_eq!(sent.body.as_deref(), Some("[a]:=:[1]"));
    }

    #[tokio::test]
    async fn transport_errors_skip_callbacks() {
        let http = Arc::new(RecordingTransport::default());
        let transport = Transport::new(http, CookieJar::default());
        let (counters, callbacks) = counting_callbacks();

        let err = transport
            .call(
                RequestId::new_random(),
                "/x/",
                HttpMethod::Get,
                &Params::new(),
                callbacks,
                false,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CrudError::Transport { .. }));
        assert_eq!(counters.success.load(Ordering::SeqCst), 0);
        assert_eq!(counters.failure.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_with_two_pk_markers_moves_only_the_first() {
        let (http, transport) = transport(200, "csrftoken=tok");
        let params = Params::new().with("id", 9).pk(7).with("x", 5);
        transport
            .call(
                RequestId::new_random(),
                "/api/crud/person/",
                HttpMethod::Delete,
                &params,
                Callbacks::new(),
                true,
            )
            .await
            .unwrap();

        let sent = &http.requests()[0];
        assert_eq!(sent.url, "/api/crud/person/9/");
        assert_eq!(sent.body.as_deref(), Some("[pk::int]:=:[7]\n[x]:=:[5]"));
    }

    #[test]
    fn csrf_header_is_never_added_to_query_requests() {
        let mut request = build_request("/m/", HttpMethod::Get, &Params::new(), false);
        attach_csrf_header(&mut request, Some("tok"));
        assert!(request.headers.is_empty());

        let mut request = build_request("/m/", HttpMethod::Delete, &Params::new(), false);
        attach_csrf_header(&mut request, Some("tok"));
        assert_eq!(request.header(CSRF_HEADER), Some("tok"));
    }

    #[test]
    fn body_methods_without_pk_keep_the_url() {
        let request = build_request("/m/", HttpMethod::Put, &Params::new().with("a", 1), true);
        assert_eq!(request.url, "/m/");
        assert_eq!(request.body.as_deref(), Some("[a]:=:[1]"));
    }
}
