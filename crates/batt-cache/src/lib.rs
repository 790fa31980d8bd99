//! # Batt Cache
//!
//! Typed get/set over a pluggable string key/value store.
//!
//! - [`Cache`] - clonable handle with `get`/`set` and JSON helpers
//! - [`KeyValueStore`] - the store contract
//! - [`InMemoryStore`] - in-process store for tests and single-node use
//! - `RedisStore` - remote store, behind the `redis` feature
//!
//! ## Lifetimes
//!
//! A value is written with a [`Ttl`]. [`Ttl::Forever`] means "no expiry,
//! first write wins": writing a key that already holds a live value does
//! nothing. [`Ttl::Expires`] always overwrites.
//!
//! A missing key is reported as [`CacheError::NotFound`]; every other store
//! failure comes back unmodified as [`CacheError::Backend`].

#![doc(html_root_url = "https://docs.rs/batt-cache/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod config;
mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis;
mod store;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{BackendError, CacheError, CacheResult};
pub use memory::InMemoryStore;
pub use store::{KeyValueStore, Ttl};

#[cfg(feature = "redis")]
pub use crate::redis::RedisStore;
