//! The CRUD facade.
//!
//! [`CrudClient`] resolves an endpoint from its [`Registry`], builds the model
//! URL, and hands the call to a [`Transport`]. Three operations are offered:
//! [`CrudClient::list_or_get`] (GET), [`CrudClient::create`] (PUT) and
//! [`CrudClient::remove`] (DELETE). Ezi servers accept no other verbs, so
//! there is no update operation.

use tracing::{info_span, Instrument};

use crate::cookie::CookieSource;
use crate::transport::{attach_csrf_header, build_request, Callbacks, HttpTransport, Transport};
use crate::{
    ApiName, AppName, CallOutcome, CrudError, HttpMethod, ModelName, Params, Registry, RequestId,
};

/// Body field that repeats the CSRF token on write calls.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Per-call options.
///
/// Defaults: the `"default"` API and no callbacks.
#[derive(Debug, Default)]
pub struct CallOptions {
    pub api_name: ApiName,
    pub callbacks: Callbacks,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets a named API of the app instead of the default one.
    pub fn api(mut self, api_name: ApiName) -> Self {
        self.api_name = api_name;
        self
    }

    pub fn on_success(mut self, f: impl FnOnce(&CallOutcome) + Send + 'static) -> Self {
        self.callbacks = self.callbacks.on_success(f);
        self
    }

    pub fn on_failure(mut self, f: impl FnOnce(&CallOutcome) + Send + 'static) -> Self {
        self.callbacks = self.callbacks.on_failure(f);
        self
    }
}

/// Issues CRUD calls against registered endpoints.
#[derive(Debug)]
pub struct CrudClient<H, C> {
    registry: Registry,
    transport: Transport<H, C>,
}

impl<H: HttpTransport, C: CookieSource> CrudClient<H, C> {
    pub fn new(registry: Registry, http: H, cookies: C) -> Self {
        Self {
            registry,
            transport: Transport::new(http, cookies),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// GET `<prefix><model>/` with `params` in the query string.
    ///
    /// Returns a single record when the pk is given, otherwise the list
    /// matching the filters.
    pub async fn list_or_get(
        &self,
        app: &AppName,
        model: &ModelName,
        params: Params,
        options: CallOptions,
    ) -> Result<CallOutcome, CrudError> {
        self.execute(HttpMethod::Get, app, model, params, options).await
    }

    /// PUT `<prefix><model>/` with `params` in the body.
    pub async fn create(
        &self,
        app: &AppName,
        model: &ModelName,
        params: Params,
        options: CallOptions,
    ) -> Result<CallOutcome, CrudError> {
        self.execute(HttpMethod::Put, app, model, params, options).await
    }

    /// DELETE `<prefix><model>/`; the pk or the body filters select what is
    /// deleted.
    pub async fn remove(
        &self,
        app: &AppName,
        model: &ModelName,
        params: Params,
        options: CallOptions,
    ) -> Result<CallOutcome, CrudError> {
        self.execute(HttpMethod::Delete, app, model, params, options).await
    }

    async fn execute(
        &self,
        method: HttpMethod,
        app: &AppName,
        model: &ModelName,
        params: Params,
        options: CallOptions,
    ) -> Result<CallOutcome, CrudError> {
        let request_id = RequestId::new_random();
        let span = info_span!(
            "crud_call",
            request_id = %request_id,
            app = %app,
            api_name = %options.api_name,
            model = %model,
            method = %method
        );

        async move {
            let endpoint = self.registry.lookup(app, &options.api_name)?;
            let url = endpoint.model_url(model);

            // Write calls read the cookie once; header and field carry the same token.
            let token = if method.uses_query() {
                None
            } else {
                self.transport.csrf_token()
            };
            let params = match &token {
                Some(token) => params.with(CSRF_FIELD, token.as_str()),
                None => params,
            };

            let mut request = build_request(&url, method, &params, endpoint.pk_in_path);
            attach_csrf_header(&mut request, token.as_deref());
            self.transport
                .send_and_route(request_id, request, options.callbacks)
                .await
        }
        .instrument(span)
        .await
    }
}
