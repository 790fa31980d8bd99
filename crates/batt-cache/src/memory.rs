//! In-process store.

use crate::error::CacheResult;
use crate::store::{KeyValueStore, Ttl};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: &str, ttl: Ttl) -> Self {
        Self {
            value: value.to_string(),
            // A TTL past the clock's range never expires.
            expires_at: ttl.duration().and_then(|d| Instant::now().checked_add(d)),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A [`KeyValueStore`] backed by a concurrent map.
///
/// Expired entries are removed lazily, when they are next read or written.
/// Never fails.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries, including expired ones not yet
    /// removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Ttl) -> CacheResult<()> {
        match (ttl, self.entries.entry(key.to_string())) {
            (Ttl::Forever, MapEntry::Occupied(mut occupied)) => {
                if occupied.get().is_expired(Instant::now()) {
                    occupied.insert(Entry::new(value, ttl));
                } else {
                    tracing::trace!(key, "key already set, forever write skipped");
                }
            }
            (_, MapEntry::Occupied(mut occupied)) => {
                occupied.insert(Entry::new(value, ttl));
            }
            (_, MapEntry::Vacant(vacant)) => {
                vacant.insert(Entry::new(value, ttl));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_forever_first_writer_wins() {
        let store = InMemoryStore::new();
        store.set("k", "first", Ttl::Forever).await.unwrap();
        store.set("k", "second", Ttl::Forever).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_ttl_write_overwrites() {
        let store = InMemoryStore::new();
        store.set("k", "first", Ttl::Forever).await.unwrap();
        store
            .set("k", "second", Ttl::Expires(Duration::from_secs(60)))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let store = InMemoryStore::new();
        store
            .set("k", "v", Ttl::Expires(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_forever_write_replaces_expired_value() {
        let store = InMemoryStore::new();
        store
            .set("k", "old", Ttl::Expires(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.set("k", "new", Ttl::Forever).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryStore::new();
        store
            .set("short", "v", Ttl::Expires(Duration::from_millis(10)))
            .await
            .unwrap();
        store.set("long", "v", Ttl::Forever).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        store.purge_expired();
        assert_eq!(store.len(), 1);
    }
}
