//! Redis store.

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::store::{KeyValueStore, Ttl};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::IntoConnectionInfo;

/// A [`KeyValueStore`] backed by Redis.
///
/// [`Ttl::Forever`] writes use `SET NX`; expiring writes use `SET PX` with
/// the duration in milliseconds. Reconnection is left to the client's
/// connection manager.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connects using the first configured address.
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        let address = config
            .addresses
            .first()
            .ok_or_else(|| CacheError::backend(NoAddress))?;
        let url = if address.contains("://") {
            address.clone()
        } else {
            format!("redis://{address}")
        };

        let mut info = url.as_str().into_connection_info().map_err(CacheError::backend)?;
        if config.username.is_some() {
            info.redis.username.clone_from(&config.username);
        }
        if config.password.is_some() {
            info.redis.password.clone_from(&config.password);
        }

        let client = redis::Client::open(info).map_err(CacheError::backend)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;
        tracing::debug!(address = %address, "connected to redis");
        Ok(Self { connection })
    }

    /// Wraps an existing connection manager.
    pub const fn from_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut connection = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(CacheError::backend)
    }

    async fn set(&self, key: &str, value: &str, ttl: Ttl) -> CacheResult<()> {
        let mut command = redis::cmd("SET");
        command.arg(key).arg(value);
        match ttl {
            Ttl::Forever => {
                command.arg("NX");
            }
            Ttl::Expires(duration) => {
                // Redis rejects PX 0.
                let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX).max(1);
                command.arg("PX").arg(millis);
            }
        }

        let mut connection = self.connection.clone();
        let _: redis::Value = command
            .query_async(&mut connection)
            .await
            .map_err(CacheError::backend)?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("no cache address configured")]
struct NoAddress;
