//! Connection settings for remote stores.

use serde::{Deserialize, Serialize};

/// Where and how to reach a remote store.
///
/// Supplied once at start-up. Only the first address is used by
/// [`RedisStore`](crate::RedisStore); the list form matches cluster-style
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Store addresses, e.g. `127.0.0.1:6379` or `redis://cache:6379/0`.
    pub addresses: Vec<String>,

    /// Username for ACL authentication.
    pub username: Option<String>,

    /// Password.
    pub password: Option<String>,
}

impl CacheConfig {
    /// Creates a configuration for a single address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            addresses: vec![address.into()],
            ..Self::default()
        }
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Returns true if a remote store is configured.
    pub fn is_remote(&self) -> bool {
        !self.addresses.is_empty()
    }
}
