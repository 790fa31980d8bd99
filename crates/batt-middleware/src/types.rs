//! Common types used throughout the handler chain.

use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};

/// The HTTP request type handled by the chain.
///
/// The body is fully buffered. Route parameters, if any, are stored in the
/// request extensions as a [`Params`](batt_extract::Params) value.
pub type Request = http::Request<Bytes>;

/// The HTTP response type produced by the chain.
pub type Response = http::Response<Bytes>;

/// Extension trait for building JSON responses.
pub trait ResponseExt {
    /// Creates an `application/json` response from an already encoded body.
    fn json(status: StatusCode, body: impl Into<Bytes>) -> Response;

    /// Creates a `{"message": ...}` response.
    fn message(status: StatusCode, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn json(status: StatusCode, body: impl Into<Bytes>) -> Response {
        let mut response = http::Response::new(body.into());
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }

    fn message(status: StatusCode, message: &str) -> Response {
        let body = serde_json::json!({ "message": message });
        Self::json(status, body.to_string())
    }
}
