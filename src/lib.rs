//! # redis-cache-driver
//!
//! Redis driver for the cache interface layer.
//!
//! This crate is a thin binding over the [`redis`] async client: it exposes
//! the uniform operation contract every driver in the cache family provides
//! (create/destroy manager, get/release connection, cache/get/destroy/flush
//! values) so a higher-level data-access layer can stay store-agnostic. All
//! protocol work, pooling, and eviction belong to the wrapped client or the
//! store; this crate validates inputs and maps client results onto a fixed
//! outcome taxonomy.
//!
//! ## Quick Start
//!
//! ```ignore
//! use redis_cache_driver::{ManagerOptions, RedisManager};
//! use serde_json::json;
//!
//! let manager = RedisManager::create("redis://127.0.0.1:6379/0", ManagerOptions::default())?;
//! let mut conn = manager.get_connection().await?;
//!
//! conn.cache_value("greeting", "hello", None).await?;
//! let cached = conn.get_cached_value("greeting").await?;
//! assert_eq!(cached, Some(json!("hello")));
//!
//! conn.destroy_cached_values(&json!(["greeting"])).await?;
//! manager.release_connection(conn)?;
//! manager.destroy();
//! ```
//!
//! ## Outcomes
//!
//! Every operation resolves exactly once, either to its success value or to
//! one variant of [`Error`]. Validation failures (`Malformed`,
//! `InvalidOptions`, `InvalidKeys`, `InvalidValue`) are raised locally before
//! the client is called; everything else (`FailedToConnect`, `BadConnection`,
//! `Failed`) comes back from an attempted client operation. A read miss is
//! not an error: it is `Ok(None)`.

#[macro_use]
extern crate log;

pub mod connection;
pub mod driver;
pub mod error;
pub mod manager;
pub mod options;

// Re-exports for convenience
pub use connection::RedisConnection;
pub use driver::{CacheDriver, RedisDriver};
pub use error::{Error, Result};
pub use manager::RedisManager;
pub use options::{ClientOptions, FlushOptions, ManagerOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
