//! The store abstraction behind [`Cache`](crate::Cache).

use crate::error::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Lifetime of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Never expires. The write only happens if the key has no live value,
    /// so the first writer wins.
    Forever,
    /// Expires after the duration. The write always overwrites.
    Expires(Duration),
}

impl Ttl {
    /// Converts a duration, treating zero as [`Ttl::Forever`].
    pub const fn from_duration(duration: Duration) -> Self {
        if duration.is_zero() {
            Self::Forever
        } else {
            Self::Expires(duration)
        }
    }

    /// Returns the expiry duration, or `None` for [`Ttl::Forever`].
    pub const fn duration(self) -> Option<Duration> {
        match self {
            Self::Forever => None,
            Self::Expires(duration) => Some(duration),
        }
    }

    /// Returns true for [`Ttl::Forever`].
    pub const fn is_forever(self) -> bool {
        matches!(self, Self::Forever)
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

/// A string key/value store.
///
/// Implementations report a missing key as `Ok(None)`; everything else they
/// return is a backend failure.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` with the given lifetime.
    async fn set(&self, key: &str, value: &str, ttl: Ttl) -> CacheResult<()>;
}
