//! Route parameter storage.
//!
//! Routers sit outside this crate. Whatever router matched the request stores
//! the captured parameters as a [`Params`] value in the request extensions, and
//! [`RawRequest::from_http`](crate::RawRequest::from_http) picks them up from
//! there.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Route parameters captured by a router, as `(name, value)` pairs.
///
/// Uses small-vector optimization to avoid heap allocation for the common
/// case of a handful of parameters.
///
/// # Example
///
/// ```rust
/// use batt_extract::Params;
///
/// let mut params = Params::new();
/// params.push("id", "123");
/// params.push("action", "view");
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Builder-style variant of [`Params::push`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the first value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        assert!(params.is_empty());

        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn test_params_from_iter_keeps_order() {
        let params: Params = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(params.get("a"), Some("1"));
    }
}
