//! An active connection and the cache operations that run over it.
//!
//! Values are stored as JSON text, so anything serializable round-trips and
//! other drivers in the family can read the same entries. Input shapes are
//! validated locally before any command is sent; once a command is sent, the
//! client's error is mapped onto the shared taxonomy.

use crate::error::{Error, Result};
use crate::options::{json_type_name, FlushOptions};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// An opaque handle to an open Redis session.
///
/// Produced by [`RedisManager::get_connection`](crate::RedisManager::get_connection)
/// and released through the same manager. The underlying multiplexed
/// connection is owned and lifecycled by the redis client; this handle only
/// carries it plus the id the manager tracks it under.
#[derive(Debug)]
pub struct RedisConnection {
    id: u64,
    conn: MultiplexedConnection,
}

impl RedisConnection {
    pub(crate) fn new(id: u64, conn: MultiplexedConnection) -> Self {
        RedisConnection { id, conn }
    }

    /// The id this connection is registered under in its manager.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Store a value under a key, optionally expiring it after `ttl`.
    ///
    /// The value may be any serializable type; a value that cannot be
    /// serialized is reported as [`Error::InvalidValue`] without contacting
    /// the store. A TTL below one second is clamped to one second.
    pub async fn cache_value<V: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &V,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let payload = encode_value(key, value)?;

        match ttl {
            Some(ttl) => {
                let secs = ttl.as_secs().max(1);
                let _: () = self
                    .conn
                    .set_ex(key, payload, secs)
                    .await
                    .map_err(|e| Error::from_command("SETEX", e))?;
                debug!("✓ Redis SET {} (TTL: {}s)", key, secs);
            }
            None => {
                let _: () = self
                    .conn
                    .set(key, payload)
                    .await
                    .map_err(|e| Error::from_command("SET", e))?;
                debug!("✓ Redis SET {}", key);
            }
        }
        Ok(())
    }

    /// Fetch the value cached under a key.
    ///
    /// Returns `Ok(None)` when the key is absent. An entry that is not valid
    /// JSON (written by something other than this driver family) comes back
    /// as a plain JSON string rather than an error.
    pub async fn get_cached_value(&mut self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .get(key)
            .await
            .map_err(|e| Error::from_command("GET", e))?;

        match raw {
            Some(text) => {
                debug!("✓ Redis GET {} -> HIT", key);
                let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
                Ok(Some(value))
            }
            None => {
                debug!("✓ Redis GET {} -> MISS", key);
                Ok(None)
            }
        }
    }

    /// Destroy the entries under the given keys.
    ///
    /// `keys` must be an array of strings; a bare string, a number, a
    /// mapping, or an array holding anything but strings is reported as
    /// [`Error::InvalidKeys`] before any delete is attempted. Keys that were
    /// never set are not an error.
    pub async fn destroy_cached_values(&mut self, keys: &Value) -> Result<()> {
        let keys = validate_keys(keys)?;
        if keys.is_empty() {
            debug!("✓ Redis DEL skipped, no keys given");
            return Ok(());
        }

        let _: i64 = self
            .conn
            .del(&keys)
            .await
            .map_err(|e| Error::from_command("DEL", e))?;

        debug!("✓ Redis DEL {} key(s)", keys.len());
        Ok(())
    }

    /// Remove every entry in a logical database.
    ///
    /// With `options.db` set, that database is selected first and stays
    /// selected on this connection afterwards. There is no not-found case: a
    /// flush either succeeds or fails.
    pub async fn flush_cache(&mut self, options: FlushOptions) -> Result<()> {
        if let Some(db) = options.db {
            let _: () = redis::cmd("SELECT")
                .arg(db)
                .query_async(&mut self.conn)
                .await
                .map_err(|e| Error::from_command("SELECT", e))?;
        }

        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut self.conn)
            .await
            .map_err(|e| Error::from_command("FLUSHDB", e))?;

        match options.db {
            Some(db) => warn!("⚠ Redis FLUSHDB executed on db {}", db),
            None => warn!("⚠ Redis FLUSHDB executed on the selected db"),
        }
        Ok(())
    }
}

/// Serialize a value for storage, before the store is contacted.
fn encode_value<V: Serialize + ?Sized>(key: &str, value: &V) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::InvalidValue(format!("value for `{}`: {}", key, e)))
}

/// Check that a keys argument is a collection of strings.
fn validate_keys(keys: &Value) -> Result<Vec<String>> {
    let items = match keys {
        Value::Array(items) => items,
        other => {
            return Err(Error::InvalidKeys(format!(
                "expected an array of keys, got {}",
                json_type_name(other)
            )))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(key) => Ok(key.clone()),
            other => Err(Error::InvalidKeys(format!(
                "expected every key to be a string, got {}",
                json_type_name(other)
            ))),
        })
        .collect()
}
