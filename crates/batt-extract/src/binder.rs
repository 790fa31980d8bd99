//! The request binder.
//!
//! [`Binder`] merges the sources of a [`RawRequest`] into a typed value in a
//! fixed order: query string, then route parameters, then body, then
//! validation. Each stage writes only the fields tagged for its source and
//! leaves every other field as the previous stage set it, so a body field
//! sharing a key with a query field overwrites it.
//!
//! Validation runs only after a body was parsed. An empty body skips both.

use crate::{
    analyze, ExtractionError, Params, RawRequest, RequestDescriptor, RequestShape, Validate,
};
use batt_core::NoParam;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Default maximum body size for binding (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// A request type the binder can populate.
///
/// Usually derived with `#[derive(Bind)]`, which implements each `merge_*`
/// method for the sources the type has tags for. A method for a source the
/// type has no tags for keeps the default no-op, so that source never touches
/// the value.
pub trait Bind: RequestShape + Validate + Default + Sized {
    /// Writes the query-tagged fields present in `query`.
    fn merge_query(&mut self, query: &str) -> Result<(), ExtractionError> {
        let _ = query;
        Ok(())
    }

    /// Writes the params-tagged fields present in `params`.
    fn merge_params(&mut self, params: &Params) -> Result<(), ExtractionError> {
        let _ = params;
        Ok(())
    }

    /// Writes the json-tagged fields present in a JSON body.
    fn merge_json(&mut self, body: &[u8]) -> Result<(), ExtractionError> {
        let _ = body;
        Ok(())
    }

    /// Writes the form-tagged fields present in a URL-encoded body.
    fn merge_form(&mut self, body: &[u8]) -> Result<(), ExtractionError> {
        let _ = body;
        Ok(())
    }
}

impl RequestShape for NoParam {
    const FIELDS: &'static [crate::FieldBinding] = &[];
    const NO_INPUT: bool = true;
}

impl Validate for NoParam {}

impl Bind for NoParam {}

/// Binder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinderConfig {
    /// Run [`Validate`] after the body stage.
    pub validate: bool,
    /// Maximum accepted body size in bytes.
    pub max_body_size: usize,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            validate: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl BinderConfig {
    /// Returns a config with validation turned off.
    #[must_use]
    pub fn without_validation() -> Self {
        Self {
            validate: false,
            ..Self::default()
        }
    }
}

/// Binds raw requests into `T`.
///
/// The descriptor of `T` is computed once, when the binder is created.
///
/// # Example
///
/// ```rust
/// use batt_extract::{Bind, Binder, BinderConfig, RawRequest};
/// use http::Uri;
///
/// #[derive(Debug, Default, Bind)]
/// struct ListUsers {
///     #[bind(query = "page")]
///     page: u32,
///     #[bind(params = "org")]
///     org: String,
/// }
///
/// let binder = Binder::<ListUsers>::new(BinderConfig::default());
/// let raw = RawRequest::builder()
///     .uri(Uri::from_static("/orgs/acme/users?page=3"))
///     .param("org", "acme")
///     .build();
///
/// let req = binder.bind(&raw).unwrap();
/// assert_eq!(req.page, 3);
/// assert_eq!(req.org, "acme");
/// ```
pub struct Binder<T> {
    descriptor: RequestDescriptor,
    config: BinderConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Bind> Binder<T> {
    /// Creates a binder for `T`.
    #[must_use]
    pub fn new(config: BinderConfig) -> Self {
        Self {
            descriptor: analyze::<T>(),
            config,
            _marker: PhantomData,
        }
    }

    /// Binds `raw` into a new `T`, stopping at the first failing stage.
    pub fn bind(&self, raw: &RawRequest) -> Result<T, ExtractionError> {
        let mut value = T::default();
        if !self.descriptor.has_input() {
            return Ok(value);
        }

        if let Some(query) = raw.query_string().filter(|q| !q.is_empty()) {
            tracing::trace!(stage = "query", "binding request");
            value.merge_query(query)?;
        }

        if !raw.params().is_empty() {
            tracing::trace!(stage = "params", count = raw.params().len(), "binding request");
            value.merge_params(raw.params())?;
        }

        let parsed_body = self.descriptor.has_body_tags() && self.merge_body(&mut value, raw)?;
        if parsed_body && self.config.validate {
            value
                .validate()
                .map_err(ExtractionError::validation_failed)?;
        }

        Ok(value)
    }

    // Returns whether a body was parsed. An empty body is not, and so is
    // never validated.
    fn merge_body(&self, value: &mut T, raw: &RawRequest) -> Result<bool, ExtractionError> {
        let body = raw.body();
        if body.len() > self.config.max_body_size {
            return Err(ExtractionError::payload_too_large(
                self.config.max_body_size,
                body.len(),
            ));
        }

        if body.is_empty() {
            return Ok(false);
        }

        let content_type = raw.content_type();
        match content_type.and_then(|ct| ct.parse::<mime::Mime>().ok()) {
            Some(m)
                if m.type_() == mime::APPLICATION
                    && (m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)) =>
            {
                tracing::trace!(stage = "body", format = "json", "binding request");
                value.merge_json(body)?;
            }
            Some(m) if m.type_() == mime::APPLICATION && m.subtype() == mime::WWW_FORM_URLENCODED => {
                tracing::trace!(stage = "body", format = "form", "binding request");
                value.merge_form(body)?;
            }
            _ => return Err(ExtractionError::unsupported_media_type(content_type)),
        }
        Ok(true)
    }

    /// Returns the descriptor computed for `T`.
    #[must_use]
    pub const fn descriptor(&self) -> RequestDescriptor {
        self.descriptor
    }

    /// Returns the binder settings.
    #[must_use]
    pub const fn config(&self) -> BinderConfig {
        self.config
    }
}

impl<T> Clone for Binder<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            config: self.config,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("type", &std::any::type_name::<T>())
            .field("descriptor", &self.descriptor)
            .field("config", &self.config)
            .finish()
    }
}
