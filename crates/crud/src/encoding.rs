//! Parameter encoding for the two wire formats.
//!
//! Query methods (GET, HEAD) carry parameters as `?key=value&...`. Every other
//! method carries them in the body as `[key]:=:[value]` records, one per line.
//!
//! Neither format escapes its input. Keys or values containing `&`, `=`, `]`
//! or a newline produce output the server will misparse.

use crate::params::Params;

/// Opens a body record, in front of the key.
pub const RECORD_OPEN: &str = "[";

/// Sits between a record's key and its value.
pub const RECORD_DELIMITER: &str = "]:=:[";

/// Closes a body record, after the value.
pub const RECORD_CLOSE: &str = "]";

/// Separates body records.
pub const RECORD_SEPARATOR: &str = "\n";

/// The key that leaves the parameters for the URL path: the first
/// primary-key marker, and only when the endpoint puts the pk in the path.
fn relocated_key(params: &Params, pk_in_path: bool) -> Option<&str> {
    if !pk_in_path {
        return None;
    }
    params.primary_key_entry().map(|(key, _)| key)
}

/// Encodes `params` as a URL suffix for a query method.
///
/// With `pk_in_path`, the first primary-key value is placed in front of the
/// `?` instead of in the query, so appending the result to a model URL yields
/// `<model url><pk>?rest`. Any further marker stays in the query.
pub fn encode_query(params: &Params, pk_in_path: bool) -> String {
    let relocated = relocated_key(params, pk_in_path);
    let mut path = String::new();
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params.iter() {
        if Some(key) == relocated {
            path.push_str(value);
        } else {
            pairs.push(format!("{key}={value}"));
        }
    }

    if !pairs.is_empty() {
        path.push('?');
        path.push_str(&pairs.join("&"));
    }
    path
}

/// Encodes `params` as a request body for a non-query method.
///
/// With `pk_in_path`, the first primary-key field is left out; the caller
/// moves it into the URL. Any further marker stays in the body.
pub fn encode_body(params: &Params, pk_in_path: bool) -> String {
    let relocated = relocated_key(params, pk_in_path);
    params
        .iter()
        .filter(|(key, _)| Some(*key) != relocated)
        .map(|(key, value)| format!("{RECORD_OPEN}{key}{RECORD_DELIMITER}{value}{RECORD_CLOSE}"))
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}
