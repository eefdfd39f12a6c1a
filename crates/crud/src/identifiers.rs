//! Newtype domain identifiers.
//!
//! Every name that selects an endpoint is a distinct newtype wrapping a
//! `String`. This prevents accidentally passing — for example — an
//! [`ApiName`] where an [`AppName`] is expected, even though both are strings
//! on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API name used when a caller does not select one explicitly.
pub const DEFAULT_API_NAME: &str = "default";

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and
// serde conversions that reject empty values.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| {
                    format!("{} must not be empty", stringify!($name))
                })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Endpoint selection
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies the server application that owns one or more CRUD APIs.
    AppName
}

string_id! {
    /// Identifies one API within an application.
    ///
    /// Applications that expose a single API register it under
    /// [`DEFAULT_API_NAME`].
    ApiName
}

string_id! {
    /// Names a model exposed by a CRUD API (e.g. `"Person"`).
    ///
    /// The URL segment is the lowercased name; see [`ModelName::path_segment`].
    ModelName
}

impl Default for ApiName {
    fn default() -> Self {
        Self(DEFAULT_API_NAME.to_string())
    }
}

impl ModelName {
    /// Returns the lowercased name used as the model's URL segment.
    pub fn path_segment(&self) -> String {
        self.0.to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Request correlation
// ---------------------------------------------------------------------------

/// Identifies a single facade call.
///
/// Generated fresh for every call and recorded on its tracing span and on the
/// resulting [`crate::CallOutcome`], so log lines and outcomes can be
/// correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RequestId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        assert!(AppName::new("").is_none());
        assert_eq!(AppName::new("shop").unwrap().as_str(), "shop");
    }

    #[test]
    fn api_name_defaults_to_default() {
        assert_eq!(ApiName::default().as_str(), DEFAULT_API_NAME);
    }

    #[test]
    fn model_segment_is_lowercased() {
        let model = ModelName::new("PurchaseOrder").unwrap();
        assert_eq!(model.path_segment(), "purchaseorder");
        assert_eq!(model.to_string(), "PurchaseOrder");
    }

    #[test]
    fn deserialising_an_empty_name_fails() {
        let err = serde_json::from_str::<AppName>("\"\"").unwrap_err();
        assert!(err.to_string().contains("AppName must not be empty"));

        let app: AppName = serde_json::from_str("\"shop\"").unwrap();
        assert_eq!(app.as_str(), "shop");
    }
}
