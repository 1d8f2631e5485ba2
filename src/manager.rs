//! Connection manager: a configured factory for Redis connections.
//!
//! Creating a manager validates the connection string and binds options to
//! it, but opens nothing. Connections are acquired on demand and tracked so
//! that destroying the manager releases whatever is still open.

use crate::connection::RedisConnection;
use crate::error::{Error, Result};
use crate::options::ManagerOptions;
use dashmap::DashMap;
use redis::{Client, IntoConnectionInfo};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Registry of live connections: id to the release signal of the watcher
/// task driving that connection's socket. Dropping a sender stops the
/// watcher and with it the transport.
type ConnectionRegistry = Arc<DashMap<u64, oneshot::Sender<()>>>;

/// A configured ability to produce Redis connections.
///
/// The manager owns no open connection itself; it holds the parsed client
/// configuration plus a registry of the connections it has produced, keyed
/// by connection id.
#[derive(Debug)]
pub struct RedisManager {
    client: Client,
    connections: ConnectionRegistry,
    next_id: AtomicU64,
}

impl RedisManager {
    /// Create a manager from a connection string and options.
    ///
    /// The string must parse as a Redis locator
    /// (`redis://[:password@]host:port/db`); a string that does not parse is
    /// reported as [`Error::Malformed`] without any network activity.
    /// `client_options` overrides from the options bag are applied on top of
    /// whatever the string encodes.
    pub fn create(connection_string: &str, options: ManagerOptions) -> Result<Self> {
        let mut info = connection_string.into_connection_info().map_err(|e| {
            Error::Malformed(format!(
                "`{}` is not a valid Redis connection string: {}",
                connection_string, e
            ))
        })?;

        if let Some(client_options) = options.client_options {
            if let Some(password) = client_options.password {
                info.redis.password = Some(password);
            }
            if let Some(db) = client_options.db {
                info.redis.db = db;
            }
        }

        let client = Client::open(info)
            .map_err(|e| Error::Malformed(format!("invalid client configuration: {}", e)))?;

        debug!("✓ Redis manager created for {}", client.get_connection_info().addr);

        Ok(RedisManager {
            client,
            connections: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Acquire an active connection.
    ///
    /// The connect attempt resolves exactly once: either the client reaches
    /// ready and a handle is returned, or the first terminal failure (auth,
    /// refused, unreachable, premature close) is reported as
    /// [`Error::FailedToConnect`]. On success the connection's I/O driver is
    /// handed to a watcher task; if the transport dies while the connection
    /// is still registered, the watcher deregisters it and logs a warning
    /// rather than surfacing anything to the handle's owner.
    pub async fn get_connection(&self) -> Result<RedisConnection> {
        let (conn, driver) = self
            .client
            .create_multiplexed_tokio_connection()
            .await
            .map_err(|e| {
                if e.is_connection_refusal() {
                    Error::FailedToConnect(format!("connection refused: {}", e))
                } else {
                    Error::FailedToConnect(e.to_string())
                }
            })?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        spawn_watcher(&self.connections, id, driver);

        debug!("✓ Redis connection {} acquired", id);
        Ok(RedisConnection::new(id, conn))
    }

    /// Release a connection produced by this manager.
    ///
    /// Closes the underlying transport and removes the connection from the
    /// registry. Releasing a connection that is no longer registered (for
    /// example after the manager was destroyed, or after its transport
    /// already died) is a no-op success.
    pub fn release_connection(&self, connection: RedisConnection) -> Result<()> {
        let id = connection.id();
        // Dropping the removed sender signals the watcher to stop.
        match self.connections.remove(&id) {
            Some(_) => debug!("✓ Redis connection {} released", id),
            None => debug!("Redis connection {} was already released", id),
        }
        Ok(())
    }

    /// Release every connection this manager still tracks.
    ///
    /// Safe to call more than once; destroying a manager whose connections
    /// have all been released does nothing.
    pub fn destroy(&self) {
        let open = self.connections.len();
        self.connections.clear();
        if open > 0 {
            info!("Redis manager destroyed, released {} open connection(s)", open);
        } else {
            debug!("Redis manager destroyed, no open connections");
        }
    }

    /// Number of connections currently tracked by this manager.
    ///
    /// Connections whose transport has died are deregistered by their
    /// watcher and no longer counted here.
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }
}

impl Drop for RedisManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Register a connection and spawn the task watching its I/O driver.
///
/// The connection is registered before the watcher runs, so the registry
/// never misses an entry it later has to clean up. The watcher resolves
/// exactly once, on whichever terminal signal fires first: the driver
/// finishing (the transport died) or the registry dropping the release
/// sender (release or manager destroy).
fn spawn_watcher(
    connections: &ConnectionRegistry,
    id: u64,
    driver: impl Future<Output = ()> + Send + 'static,
) {
    let (release_tx, release_rx) = oneshot::channel::<()>();
    connections.insert(id, release_tx);

    let connections = Arc::clone(connections);
    tokio::spawn(async move {
        tokio::select! {
            _ = driver => {
                connections.remove(&id);
                warn!(
                    "Redis connection {} was closed by the server or the transport; \
                     subsequent commands on this handle will fail",
                    id
                );
            }
            _ = release_rx => {
                debug!("Redis connection {} watcher stopped", id);
            }
        }
    });
}
