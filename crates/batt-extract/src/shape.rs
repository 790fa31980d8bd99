//! Request shape metadata.
//!
//! A request type describes which of its fields each source may write through a
//! static [`FieldBinding`] table, usually generated by `#[derive(Bind)]`.
//! [`analyze`] reduces that table to a [`RequestDescriptor`], the only thing
//! the binder needs to decide which stages run.

use std::fmt;

/// A source a field can be bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindSource {
    /// Query string, `#[bind(query = "...")]`.
    Query,
    /// Route parameters, `#[bind(params = "...")]`.
    Params,
    /// JSON body, `#[bind(json = "...")]`.
    Json,
    /// URL-encoded form body, `#[bind(form = "...")]`.
    Form,
}

impl BindSource {
    /// Returns true for sources read from the request body.
    #[must_use]
    pub const fn is_body(self) -> bool {
        matches!(self, Self::Json | Self::Form)
    }

    /// Returns the attribute key used to tag a field with this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Params => "params",
            Self::Json => "json",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for BindSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding metadata for one field of a request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    name: &'static str,
    tags: &'static [(BindSource, &'static str)],
}

impl FieldBinding {
    /// Creates a field entry with its `(source, key)` tags.
    #[must_use]
    pub const fn new(name: &'static str, tags: &'static [(BindSource, &'static str)]) -> Self {
        Self { name, tags }
    }

    /// Returns the Rust field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns every `(source, key)` tag declared on the field.
    #[must_use]
    pub const fn tags(&self) -> &'static [(BindSource, &'static str)] {
        self.tags
    }

    /// Returns the key this field is bound to in `source`, if any.
    #[must_use]
    pub fn key(&self, source: BindSource) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, key)| *key)
    }

    /// Returns true if the field carries a body tag.
    #[must_use]
    pub fn has_body_tag(&self) -> bool {
        self.tags.iter().any(|(source, _)| source.is_body())
    }
}

/// Static binding metadata of a request type.
///
/// Implemented by `#[derive(Bind)]`. Hand-written impls must keep `FIELDS`
/// consistent with what the type's [`Bind`](crate::Bind) methods touch.
pub trait RequestShape {
    /// Every visible field with its tags. Untagged fields have empty tags.
    const FIELDS: &'static [FieldBinding];

    /// True only for the empty marker type, which never reads any source.
    const NO_INPUT: bool = false;
}

/// Which binding stages apply to a request type.
///
/// Computed once per request type from its [`RequestShape`] and read-only
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDescriptor {
    has_input: bool,
    has_body_tags: bool,
}

impl RequestDescriptor {
    /// Returns false only for the empty marker type.
    #[must_use]
    pub const fn has_input(&self) -> bool {
        self.has_input
    }

    /// Returns true if any field declares a body tag.
    #[must_use]
    pub const fn has_body_tags(&self) -> bool {
        self.has_body_tags
    }
}

/// Computes the descriptor of `T` from its field table.
///
/// Never fails: a type with zero fields yields `has_input = true` and
/// `has_body_tags = false`.
///
/// # Example
///
/// ```rust
/// use batt_extract::{analyze, Bind, NoParam};
///
/// #[derive(Default, Bind)]
/// struct CreateUser {
///     #[bind(params = "org")]
///     org: String,
///     #[bind(json = "name")]
///     name: String,
/// }
///
/// let descriptor = analyze::<CreateUser>();
/// assert!(descriptor.has_input());
/// assert!(descriptor.has_body_tags());
///
/// assert!(!analyze::<NoParam>().has_input());
/// ```
#[must_use]
pub fn analyze<T: RequestShape + ?Sized>() -> RequestDescriptor {
    RequestDescriptor {
        has_input: !T::NO_INPUT,
        has_body_tags: T::FIELDS.iter().any(FieldBinding::has_body_tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct QueryOnly;

    impl RequestShape for QueryOnly {
        const FIELDS: &'static [FieldBinding] = &[
            FieldBinding::new("page", &[(BindSource::Query, "page")]),
            FieldBinding::new("internal", &[]),
        ];
    }

    struct Mixed;

    impl RequestShape for Mixed {
        const FIELDS: &'static [FieldBinding] = &[FieldBinding::new(
            "name",
            &[(BindSource::Query, "name"), (BindSource::Form, "full_name")],
        )];
    }

    struct Fieldless;

    impl RequestShape for Fieldless {
        const FIELDS: &'static [FieldBinding] = &[];
    }

    #[test]
    fn test_query_only_has_no_body_tags() {
        let d = analyze::<QueryOnly>();
        assert!(d.has_input());
        assert!(!d.has_body_tags());
    }

    #[test]
    fn test_form_tag_counts_as_body() {
        assert!(analyze::<Mixed>().has_body_tags());
        let field = Mixed::FIELDS[0];
        assert_eq!(field.key(BindSource::Form), Some("full_name"));
        assert_eq!(field.key(BindSource::Json), None);
    }

    #[test]
    fn test_fieldless_type_still_has_input() {
        let d = analyze::<Fieldless>();
        assert!(d.has_input());
        assert!(!d.has_body_tags());
    }

    #[test]
    fn test_descriptor_is_reproducible() {
        assert_eq!(analyze::<Mixed>(), analyze::<Mixed>());
    }

    #[test]
    fn test_source_helpers() {
        assert!(BindSource::Json.is_body());
        assert!(!BindSource::Params.is_body());
        assert_eq!(BindSource::Params.to_string(), "params");
    }
}
