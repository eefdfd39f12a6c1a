//! Endpoint registry and its serialisable configuration.
//!
//! The [`Registry`] maps an (app, api name) pair to an
//! [`EndpointDescriptor`]. It is built once, then handed to a
//! [`crate::CrudClient`], which only reads it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiName, AppName, CrudError, EndpointDescriptor};

/// Registered endpoints, keyed by application then API name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    endpoints: HashMap<AppName, HashMap<ApiName, EndpointDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the descriptor for (app, api name), replacing any earlier one.
    ///
    /// Other API names registered for the same app are untouched. Returns the
    /// replaced descriptor, if there was one.
    pub fn register(
        &mut self,
        app: AppName,
        prefix: impl Into<String>,
        api_name: ApiName,
        pk_in_path: bool,
    ) -> Option<EndpointDescriptor> {
        let descriptor = EndpointDescriptor::new(prefix, pk_in_path);
        debug!(
            app = %app,
            api_name = %api_name,
            prefix = %descriptor.prefix,
            pk_in_path,
            "registering endpoint"
        );
        self.endpoints
            .entry(app)
            .or_default()
            .insert(api_name, descriptor)
    }

    /// Registers `prefix` as the app's default API with the pk kept out of
    /// the path.
    pub fn register_default(
        &mut self,
        app: AppName,
        prefix: impl Into<String>,
    ) -> Option<EndpointDescriptor> {
        self.register(app, prefix, ApiName::default(), false)
    }

    /// Returns the descriptor for (app, api name).
    pub fn lookup(&self, app: &AppName, api_name: &ApiName) -> Result<&EndpointDescriptor, CrudError> {
        self.endpoints
            .get(app)
            .and_then(|apis| apis.get(api_name))
            .ok_or_else(|| CrudError::EndpointNotFound {
                app: app.clone(),
                api_name: api_name.clone(),
            })
    }

    /// Number of registered (app, api name) pairs.
    pub fn len(&self) -> usize {
        self.endpoints.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One endpoint entry in a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub app: AppName,
    pub prefix: String,
    #[serde(default)]
    pub api_name: ApiName,
    #[serde(default)]
    pub pk_in_path: bool,
}

/// Client configuration as loaded from a JSON file.
///
/// ```json
/// {
///   "base_url": "https://shop.example.com",
///   "timeout_secs": 30,
///   "endpoints": [
///     { "app": "shop", "prefix": "/api/crud/" },
///     { "app": "shop", "api_name": "v2", "prefix": "/api/v2/", "pk_in_path": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base against which relative endpoint prefixes are resolved.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Whole-request timeout for the HTTP transport. `None` means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl ClientConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, CrudError> {
        serde_json::from_str(json).map_err(|e| CrudError::Configuration {
            message: e.to_string(),
        })
    }

    /// Builds a registry from the endpoint entries. Later entries win.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        for entry in &self.endpoints {
            registry.register(
                entry.app.clone(),
                entry.prefix.clone(),
                entry.api_name.clone(),
                entry.pk_in_path,
            );
        }
        registry
    }
}
