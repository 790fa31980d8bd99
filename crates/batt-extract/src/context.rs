//! Raw request sources.
//!
//! [`RawRequest`] is everything the binder may read: the query string, the
//! route parameters and the body with its declared content type. None of the
//! three is required to be present.

use crate::Params;
use bytes::Bytes;
use http::{header, HeaderMap, Method, Uri};

/// Untyped sources of one incoming request.
///
/// # Example
///
/// ```rust
/// use batt_extract::{Params, RawRequest};
/// use bytes::Bytes;
/// use http::{HeaderMap, Method, Uri};
///
/// let raw = RawRequest::new(
///     Method::GET,
///     Uri::from_static("/users/123?page=2"),
///     HeaderMap::new(),
///     Bytes::new(),
///     Params::new().with("id", "123"),
/// );
///
/// assert_eq!(raw.query_string(), Some("page=2"));
/// assert_eq!(raw.params().get("id"), Some("123"));
/// ```
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
}

impl RawRequest {
    /// Creates a raw request from its parts.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes, params: Params) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            params,
        }
    }

    /// Creates a raw request from an `http` request.
    ///
    /// Route parameters are taken from the request extensions, where the
    /// router is expected to have stored a [`Params`] value. A request without
    /// one has no route parameters.
    #[must_use]
    pub fn from_http(request: http::Request<Bytes>) -> Self {
        let (mut parts, body) = request.into_parts();
        let params = parts.extensions.remove::<Params>().unwrap_or_default();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params,
        }
    }

    /// Returns a builder for constructing a raw request.
    #[must_use]
    pub fn builder() -> RawRequestBuilder {
        RawRequestBuilder::default()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE)
    }

    /// Returns the request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the route parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }
}

/// Builder for constructing a [`RawRequest`].
///
/// Method defaults to `GET` and the URI to `/`.
#[derive(Debug, Default)]
pub struct RawRequestBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
}

impl RawRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a single header. Invalid header values are ignored.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a single route parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(name, value);
        self
    }

    /// Builds the raw request.
    #[must_use]
    pub fn build(self) -> RawRequest {
        RawRequest {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_takes_params_from_extensions() {
        let mut request = http::Request::builder()
            .method(Method::POST)
            .uri("/user/123?page=1")
            .header("content-type", "application/json")
            .body(Bytes::from_static(br#"{"name":"Hello"}"#))
            .unwrap();
        request
            .extensions_mut()
            .insert(Params::new().with("id", "123"));

        let raw = RawRequest::from_http(request);

        assert_eq!(raw.method(), &Method::POST);
        assert_eq!(raw.query_string(), Some("page=1"));
        assert_eq!(raw.params().get("id"), Some("123"));
        assert_eq!(raw.content_type(), Some("application/json"));
        assert_eq!(raw.body().as_ref(), br#"{"name":"Hello"}"#);
    }

    #[test]
    fn test_from_http_without_params() {
        let request = http::Request::new(Bytes::new());
        let raw = RawRequest::from_http(request);

        assert!(raw.params().is_empty());
        assert_eq!(raw.query_string(), None);
    }

    #[test]
    fn test_builder_defaults() {
        let raw = RawRequest::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("name=alice")
            .param("version", "v1")
            .build();

        assert_eq!(raw.method(), &Method::GET);
        assert_eq!(raw.uri().path(), "/");
        assert_eq!(
            raw.content_type(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(raw.params().get("version"), Some("v1"));
    }
}
