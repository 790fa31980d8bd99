//! Error types for cache operations.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Boxed error returned by a store backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No value is stored under the key.
    #[error("item not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The value could not be encoded as JSON. The store was not touched.
    #[error("failed to serialize value for key {key}: {source}")]
    Serialization {
        /// The key being written.
        key: String,
        /// The encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The stored value could not be decoded as the requested type.
    #[error("failed to deserialize value for key {key}: {source}")]
    Deserialization {
        /// The key being read.
        key: String,
        /// The decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The store failed. The backend error is kept as-is.
    #[error(transparent)]
    Backend(BackendError),
}

impl CacheError {
    /// Creates a not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    /// Returns true if the key had no value.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the backend error as `E`, if it is one.
    pub fn backend_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Backend(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
