//! Request context types.
//!
//! The [`RequestContext`] carries per-request state through the handler chain
//! and into business logic.

use crate::identity::AuthUser;
use http::Extensions;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use batt_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    ///
    /// This is useful when parsing request IDs from headers or other sources.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context handed to middleware and business logic.
///
/// Values are stored by type, so every slot is strongly typed: the auth gate
/// stores an [`AuthUser<U>`] and business logic reads it back with
/// [`RequestContext::auth_user`]. Nothing is looked up by string key.
///
/// The context lives for exactly one request. It is cloned when handed to
/// business logic, so extensions must be `Clone`.
///
/// # Example
///
/// ```
/// use batt_core::{AuthUser, RequestContext};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct User {
///     id: u64,
/// }
///
/// let mut ctx = RequestContext::new();
/// assert!(ctx.auth_user::<User>().is_none());
///
/// ctx.insert_extension(AuthUser::new(User { id: 7 }));
/// assert_eq!(ctx.auth_user::<User>(), Some(&User { id: 7 }));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// When the request started processing.
    started_at: Instant,

    /// Typed request-scoped values.
    extensions: Extensions,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a new request context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            extensions: Extensions::new(),
        }
    }

    /// Creates a mock context for testing purposes.
    #[must_use]
    pub fn mock() -> Self {
        Self::new()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed value, returning the previous value of the same type.
    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    /// Returns a new context with the typed value stored.
    #[must_use]
    pub fn with_extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Returns the stored value of type `T`, if any.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Removes and returns the stored value of type `T`.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions.remove::<T>()
    }

    /// Drops every stored value. The request ID and start time are kept.
    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }

    /// Returns the authenticated user of type `U` stored by the auth gate.
    ///
    /// `None` means no user of that type was stored for this request; callers
    /// must not substitute a default user.
    #[must_use]
    pub fn auth_user<U: Send + Sync + 'static>(&self) -> Option<&U> {
        self.extension::<AuthUser<U>>().map(AuthUser::get)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_display() {
        let display = RequestId::new().to_string();
        assert_eq!(display.len(), 36, "UUID string should be 36 characters");
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_extensions_are_typed() {
        let mut ctx = RequestContext::new();
        assert!(ctx.extension::<Tenant>().is_none());

        ctx.insert_extension(Tenant("acme"));
        assert_eq!(ctx.extension::<Tenant>(), Some(&Tenant("acme")));

        let previous = ctx.insert_extension(Tenant("globex"));
        assert_eq!(previous, Some(Tenant("acme")));
        assert_eq!(ctx.remove_extension::<Tenant>(), Some(Tenant("globex")));
        assert!(ctx.extension::<Tenant>().is_none());
    }

    #[test]
    fn test_clear_extensions_keeps_request_id() {
        let ctx = RequestContext::new().with_extension(Tenant("acme"));
        let id = ctx.request_id();

        let mut cleared = ctx.clone();
        cleared.clear_extensions();

        assert_eq!(cleared.request_id(), id);
        assert!(cleared.extension::<Tenant>().is_none());
        assert!(ctx.extension::<Tenant>().is_some());
    }

    #[test]
    fn test_auth_user_lookup_is_per_type() {
        let ctx = RequestContext::new().with_extension(AuthUser::new(String::from("alice")));

        assert_eq!(ctx.auth_user::<String>().map(String::as_str), Some("alice"));
        assert!(ctx.auth_user::<u64>().is_none());
    }
}
