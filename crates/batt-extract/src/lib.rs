//! # Batt Extract
//!
//! Declarative request binding.
//!
//! A request type declares, per field, which sources may write it:
//!
//! | Attribute | Source | Decoder |
//! |-----------|--------|---------|
//! | `#[bind(query = "...")]` | Query string | `serde_urlencoded` |
//! | `#[bind(params = "...")]` | Route parameters | `serde_urlencoded` |
//! | `#[bind(json = "...")]` | `application/json` body | `serde_json` |
//! | `#[bind(form = "...")]` | `application/x-www-form-urlencoded` body | `serde_urlencoded` |
//!
//! [`analyze`] reduces those declarations to a [`RequestDescriptor`] and
//! [`Binder`] applies the stages in order: query, params, body, validation.
//!
//! ## Example
//!
//! ```rust
//! use batt_extract::{Bind, Binder, BinderConfig, RawRequest};
//! use http::{Method, Uri};
//!
//! #[derive(Debug, Default, PartialEq, Bind)]
//! struct UpdateUser {
//!     #[bind(query = "page")]
//!     page: i64,
//!     #[bind(params = "id")]
//!     id: String,
//!     #[bind(json = "name")]
//!     name: String,
//! }
//!
//! let raw = RawRequest::builder()
//!     .method(Method::POST)
//!     .uri(Uri::from_static("/user/123?page=1"))
//!     .param("id", "123")
//!     .header("content-type", "application/json")
//!     .body(r#"{"name":"Hello"}"#)
//!     .build();
//!
//! let req = Binder::<UpdateUser>::new(BinderConfig::default()).bind(&raw).unwrap();
//! assert_eq!(
//!     req,
//!     UpdateUser { page: 1, id: "123".into(), name: "Hello".into() }
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/batt-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod context;
mod decode;
mod error;
mod params;
mod shape;
mod validate;

pub use binder::{Bind, Binder, BinderConfig, DEFAULT_MAX_BODY_SIZE};
pub use context::{RawRequest, RawRequestBuilder};
pub use error::{BindStage, ExtractionError};
pub use params::Params;
pub use shape::{analyze, BindSource, FieldBinding, RequestDescriptor, RequestShape};
pub use validate::Validate;

pub use batt_core::{FieldErrors, NoParam};
pub use batt_macros::Bind;

#[doc(hidden)]
pub mod __private {
    pub use crate::decode::{decode_form, decode_json, decode_params, decode_query, serde};
}
