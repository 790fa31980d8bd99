//! The cache handle.

use crate::error::{CacheError, CacheResult};
use crate::memory::InMemoryStore;
use crate::store::{KeyValueStore, Ttl};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Typed access to a [`KeyValueStore`].
///
/// Cheap to clone; clones share the store. The handle keeps no local copy of
/// any value.
///
/// # Example
///
/// ```
/// use batt_cache::{Cache, Ttl};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Session {
///     user: String,
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), batt_cache::CacheError> {
/// let cache = Cache::in_memory();
///
/// cache.set_json("session:1", &Session { user: "ada".into() }, Ttl::Forever).await?;
/// let session: Session = cache.get_json("session:1").await?;
/// assert_eq!(session.user, "ada");
///
/// assert!(cache.get("session:2").await.unwrap_err().is_not_found());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
}

impl Cache {
    /// Creates a cache over `store`.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a cache over a shared store.
    pub fn from_arc(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Creates a cache over a fresh [`InMemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }

    /// Connects to the Redis store described by `config`.
    #[cfg(feature = "redis")]
    pub async fn redis(config: &crate::CacheConfig) -> CacheResult<Self> {
        Ok(Self::new(crate::redis::RedisStore::connect(config).await?))
    }

    /// Returns the value stored under `key`.
    ///
    /// A missing key is [`CacheError::NotFound`].
    pub async fn get(&self, key: &str) -> CacheResult<String> {
        tracing::trace!(key, "cache get");
        self.store
            .get(key)
            .await?
            .ok_or_else(|| CacheError::not_found(key))
    }

    /// Stores `value` under `key`.
    pub async fn set(&self, key: &str, value: &str, ttl: impl Into<Ttl>) -> CacheResult<()> {
        let ttl = ttl.into();
        tracing::trace!(key, ?ttl, "cache set");
        self.store.set(key, value, ttl).await
    }

    /// Reads and decodes a JSON value.
    ///
    /// A decoding failure is returned as [`CacheError::Deserialization`]; the
    /// stored value is left as it is.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        let raw = self.get(key).await?;
        serde_json::from_str(&raw).map_err(|source| CacheError::Deserialization {
            key: key.to_string(),
            source,
        })
    }

    /// Encodes `value` as JSON and stores it.
    ///
    /// If encoding fails nothing is written.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: impl Into<Ttl>,
    ) -> CacheResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw, ttl).await
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}
