//! Cookie access for CSRF tokens.

use std::sync::{Arc, RwLock};

use percent_encoding::percent_decode_str;

/// Name of the cookie holding the CSRF token.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Supplies the current cookie string (`a=1; b=2`).
///
/// Read once per call, so the token sent is always the one current when the
/// call is issued.
pub trait CookieSource: Send + Sync {
    fn cookie_string(&self) -> Option<String>;
}

impl<T: CookieSource + ?Sized> CookieSource for Arc<T> {
    fn cookie_string(&self) -> Option<String> {
        (**self).cookie_string()
    }
}

/// Returns the percent-decoded value of cookie `name`, or `None` if absent.
///
/// Values that do not decode to UTF-8 are returned raw.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim_start)
        .find_map(|segment| segment.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| match percent_decode_str(raw).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
}

/// In-memory cookie store.
///
/// Shared between the caller and a client through [`Arc`]; updates made with
/// [`CookieJar::set`] are seen by the next call.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<String>,
}

impl CookieJar {
    pub fn new(cookies: impl Into<String>) -> Self {
        Self {
            cookies: RwLock::new(cookies.into()),
        }
    }

    /// Replaces the whole cookie string.
    pub fn set(&self, cookies: impl Into<String>) {
        let mut guard = self.cookies.write().unwrap_or_else(|p| p.into_inner());
        *guard = cookies.into();
    }

    /// Reads a single cookie from the jar.
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookie_string().and_then(|c| read_cookie(&c, name))
    }
}

impl CookieSource for CookieJar {
    fn cookie_string(&self) -> Option<String> {
        let guard = self.cookies.read().unwrap_or_else(|p| p.into_inner());
        if guard.is_empty() {
            None
        } else {
            Some(guard.clone())
        }
    }
}
