/// Cookie access for the identity boundary
///
/// The identity provider never sees cookie wire format. It gets a
/// [`CookieJar`]: read every cookie the request carried, and queue
/// `Set-Cookie` instructions (typically a refreshed session) that the
/// middleware writes onto the response.
///
/// Parsing and rendering go through `axum_extra`'s [`Cookie`] type.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use axum_extra::extract::cookie::Cookie;
/// use taskboard_shared::auth::session::{CookieJar, RequestCookies};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; taskboard_session=abc"));
///
/// let mut jar = RequestCookies::from_headers(&headers);
/// assert_eq!(jar.get("taskboard_session"), Some("abc"));
///
/// jar.set_all(vec![Cookie::build(("taskboard_session", "fresh")).path("/").http_only(true).build()]);
/// assert_eq!(jar.pending()[0].value(), "fresh");
/// ```

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::Cookie;
use tracing::debug;

/// Capability set handed to the identity provider
pub trait CookieJar: Send {
    /// Every cookie the request carried, in header order
    fn get_all(&self) -> Vec<Cookie<'static>>;

    /// Queues cookies to be set on the response
    fn set_all(&mut self, cookies: Vec<Cookie<'static>>);
}

/// Cookies parsed from request headers plus queued response cookies
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    incoming: Vec<Cookie<'static>>,
    outgoing: Vec<Cookie<'static>>,
}

impl RequestCookies {
    /// Parses every `Cookie` header
    ///
    /// Segments that are not `name=value` pairs are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(|parsed| match parsed {
                Ok(cookie) => Some(cookie.into_owned()),
                Err(e) => {
                    debug!(error = %e, "Skipping malformed cookie");
                    None
                }
            })
            .collect();

        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// First cookie with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.incoming
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.value())
    }

    /// Cookies queued for the response
    pub fn pending(&self) -> &[Cookie<'static>] {
        &self.outgoing
    }

    /// Takes the queued cookies, leaving none behind
    pub fn take_pending(&mut self) -> Vec<Cookie<'static>> {
        std::mem::take(&mut self.outgoing)
    }
}

impl CookieJar for RequestCookies {
    fn get_all(&self) -> Vec<Cookie<'static>> {
        self.incoming.clone()
    }

    fn set_all(&mut self, cookies: Vec<Cookie<'static>>) {
        self.outgoing.extend(cookies);
    }
}
