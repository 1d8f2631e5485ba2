//! The uniform driver contract shared across the cache interface family.

use crate::connection::RedisConnection;
use crate::error::Result;
use crate::manager::RedisManager;
use crate::options::{FlushOptions, ManagerOptions};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// The operation contract every driver in the cache family implements.
///
/// A higher-level data-access layer programs against this trait so that
/// application code stays store-agnostic: any compliant driver exposes the
/// same manager lifecycle and the same four cache operations with the same
/// outcome taxonomy.
pub trait CacheDriver {
    /// A configured factory for connections.
    type Manager: Send + Sync;
    /// An opaque handle to an open session with the store.
    type Connection: Send;

    /// Build a manager from a connection string and validated options.
    /// Opens no connection.
    async fn create_manager(
        connection_string: &str,
        options: ManagerOptions,
    ) -> Result<Self::Manager>;

    /// Release everything the manager still holds.
    async fn destroy_manager(manager: Self::Manager) -> Result<()>;

    /// Acquire an active connection from the manager.
    async fn get_connection(manager: &Self::Manager) -> Result<Self::Connection>;

    /// Hand a connection back to the manager that produced it.
    async fn release_connection(
        manager: &Self::Manager,
        connection: Self::Connection,
    ) -> Result<()>;

    /// Store a serializable value under a key, with optional expiry.
    async fn cache_value<V: Serialize + ?Sized + Sync>(
        connection: &mut Self::Connection,
        key: &str,
        value: &V,
        ttl: Option<Duration>,
    ) -> Result<()>;

    /// Fetch the value under a key; `Ok(None)` when the key is absent.
    async fn get_cached_value(
        connection: &mut Self::Connection,
        key: &str,
    ) -> Result<Option<Value>>;

    /// Delete the entries under a collection of string keys.
    async fn destroy_cached_values(
        connection: &mut Self::Connection,
        keys: &Value,
    ) -> Result<()>;

    /// Remove every entry in the targeted logical database.
    async fn flush_cache(connection: &mut Self::Connection, options: FlushOptions) -> Result<()>;
}

/// The Redis driver.
pub struct RedisDriver;

impl CacheDriver for RedisDriver {
    type Manager = RedisManager;
    type Connection = RedisConnection;

    async fn create_manager(
        connection_string: &str,
        options: ManagerOptions,
    ) -> Result<RedisManager> {
        RedisManager::create(connection_string, options)
    }

    async fn destroy_manager(manager: RedisManager) -> Result<()> {
        manager.destroy();
        Ok(())
    }

    async fn get_connection(manager: &RedisManager) -> Result<RedisConnection> {
        manager.get_connection().await
    }

    async fn release_connection(
        manager: &RedisManager,
        connection: RedisConnection,
    ) -> Result<()> {
        manager.release_connection(connection)
    }

    async fn cache_value<V: Serialize + ?Sized + Sync>(
        connection: &mut RedisConnection,
        key: &str,
        value: &V,
        ttl: Option<Duration>,
    ) -> Result<()> {
        connection.cache_value(key, value, ttl).await
    }

    async fn get_cached_value(
        connection: &mut RedisConnection,
        key: &str,
    ) -> Result<Option<Value>> {
        connection.get_cached_value(key).await
    }

    async fn destroy_cached_values(
        connection: &mut RedisConnection,
        keys: &Value,
    ) -> Result<()> {
        connection.destroy_cached_values(keys).await
    }

    async fn flush_cache(connection: &mut RedisConnection, options: FlushOptions) -> Result<()> {
        connection.flush_cache(options).await
    }
}
