//! Redis wrapper with graceful degradation.
//!
//! Every operation except [`RedisCache::try_get`] swallows Redis failures:
//! reads return `None`, writes return `false`, and a warning is logged. The directory server is fully usable
//! without Redis; it only loses persisted reviews, saved stacks and the
//! search-result cache.
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::error::CommonError;

#[derive(Clone)]
pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// Build a client for `url`. `None` or an unparsable URL yields a cache
    /// that no-ops on every call.
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, cache disabled"))
                .ok()
        });
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Sends a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        let client = self.client.as_ref()?;
        client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }

    /// Like [`RedisCache::get`], but tells a missing key apart from an
    /// unconfigured or unreachable store.
    pub async fn try_get(&self, key: &str) -> Result<Option<String>, CommonError> {
        let client = self.client.as_ref().ok_or(CommonError::RedisUnavailable)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()?
    }

    pub async fn set(&self, key: &str, value: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set::<_, _, ()>(key, value)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SET failed"))
            .is_ok()
    }

    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SETEX failed"))
            .is_ok()
    }

    pub async fn delete(&self, key: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.del::<_, ()>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis DEL failed"))
            .is_ok()
    }

    /// Append a value to the list at `key`.
    pub async fn push(&self, key: &str, value: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.rpush::<_, _, ()>(key, value)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis RPUSH failed"))
            .is_ok()
    }

    /// Full contents of the list at `key`. An absent key is an empty list.
    pub async fn list(&self, key: &str) -> Option<Vec<String>> {
        let mut conn = self.connection().await?;
        conn.lrange::<_, Vec<String>>(key, 0, -1)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis LRANGE failed"))
            .ok()
    }

    pub async fn add_member(&self, key: &str, member: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.sadd::<_, _, ()>(key, member)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SADD failed"))
            .is_ok()
    }

    pub async fn members(&self, key: &str) -> Option<Vec<String>> {
        let mut conn = self.connection().await?;
        conn.smembers::<_, Vec<String>>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SMEMBERS failed"))
            .ok()
    }

    /// Delete all keys under `prefix` using SCAN (KEYS blocks the server).
    pub async fn delete_by_prefix(&self, prefix: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };

        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = match redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, pattern, "redis SCAN failed");
                    return false;
                }
            };

            if !keys.is_empty() {
                if let Err(e) = conn.del::<_, ()>(&keys).await {
                    warn!(error = %e, "redis batch DEL failed during prefix delete");
                    return false;
                }
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        true
    }
}
