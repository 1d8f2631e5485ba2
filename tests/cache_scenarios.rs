//! Scenario tests for the driver surface.
//!
//! These are written against the family contract rather than anything
//! Redis-specific, so they double as conformance tests for any driver
//! implementing the same operations.
//!
//! The connect-failure tests need no server. Everything marked `#[ignore]`
//! expects a Redis at `redis://127.0.0.1:6379/15` (override with the
//! `REDIS_CACHE_DRIVER_TEST_URL` environment variable; db 15 is used so a
//! flush cannot touch real data):
//!
//! ```text
//! cargo test -- --ignored
//! ```

use redis_cache_driver::{Error, FlushOptions, ManagerOptions, RedisConnection, RedisManager};
use serde_json::{json, Value};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_url() -> String {
    std::env::var("REDIS_CACHE_DRIVER_TEST_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string())
}

/// Create a manager, acquire a connection, and start from an empty test db.
async fn setup() -> (RedisManager, RedisConnection) {
    init_logger();
    let manager = RedisManager::create(&test_url(), ManagerOptions::default())
        .expect("test connection string should parse");
    let mut conn = manager
        .get_connection()
        .await
        .expect("test Redis should be reachable (run with --ignored only when it is)");
    conn.flush_cache(FlushOptions { db: Some(15) })
        .await
        .expect("flush of the test db should succeed");
    (manager, conn)
}

#[tokio::test]
async fn unreachable_address_reports_failed_to_connect() {
    init_logger();
    // Port 1 on loopback: well-formed, nothing listening.
    let manager =
        RedisManager::create("redis://127.0.0.1:1/0", ManagerOptions::default()).unwrap();
    let err = manager.get_connection().await.unwrap_err();
    assert!(
        matches!(err, Error::FailedToConnect(_)),
        "expected FailedToConnect, got {:?}",
        err
    );
}

#[tokio::test]
async fn malformed_connection_string_never_connects() {
    init_logger();
    let err = RedisManager::create("definitely not a locator", ManagerOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Malformed(_)), "got {:?}", err);
    assert!(err.is_local());
}

#[tokio::test]
#[ignore]
async fn write_then_read_returns_written_value() {
    let (manager, mut conn) = setup().await;

    conn.cache_value("machinepack-cache.test1", "testValue", None)
        .await
        .unwrap();
    let cached = conn
        .get_cached_value("machinepack-cache.test1")
        .await
        .unwrap();
    assert_eq!(cached, Some(json!("testValue")));

    // Structured values round-trip too.
    let user = json!({ "id": 7, "name": "test" });
    conn.cache_value("machinepack-cache.test2", &user, None)
        .await
        .unwrap();
    let cached = conn
        .get_cached_value("machinepack-cache.test2")
        .await
        .unwrap();
    assert_eq!(cached, Some(user));

    manager.release_connection(conn).unwrap();
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn destroy_then_read_reports_not_found() {
    let (manager, mut conn) = setup().await;

    conn.cache_value("test1", "testValue", None).await.unwrap();
    conn.destroy_cached_values(&json!(["test1"])).await.unwrap();

    let cached = conn.get_cached_value("test1").await.unwrap();
    assert_eq!(cached, None);

    manager.release_connection(conn).unwrap();
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn destroying_never_set_keys_succeeds() {
    let (manager, mut conn) = setup().await;

    conn.destroy_cached_values(&json!(["neverset1", "neverset2"]))
        .await
        .unwrap();
    let cached = conn.get_cached_value("neverset1").await.unwrap();
    assert_eq!(cached, None);

    manager.release_connection(conn).unwrap();
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn destroy_rejects_non_collection_keys_before_the_store() {
    let (manager, mut conn) = setup().await;

    conn.cache_value("test1", "testValue", None).await.unwrap();

    for bad in [json!("somekeytodelete"), json!(1), json!({})] {
        let err = conn.destroy_cached_values(&bad).await.unwrap_err();
        assert!(
            matches!(err, Error::InvalidKeys(_)),
            "{:?} gave {:?}",
            bad,
            err
        );
    }

    // Nothing was deleted by the rejected calls.
    let cached = conn.get_cached_value("test1").await.unwrap();
    assert_eq!(cached, Some(json!("testValue")));

    manager.release_connection(conn).unwrap();
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn flush_removes_every_key_in_the_db() {
    let (manager, mut conn) = setup().await;

    let keys: Vec<String> = (1..=8).map(|n| format!("machinepack-cache.test{}", n)).collect();
    for key in &keys {
        conn.cache_value(key, "testValue", None).await.unwrap();
    }

    conn.flush_cache(FlushOptions { db: Some(15) }).await.unwrap();

    for key in &keys {
        let cached = conn.get_cached_value(key).await.unwrap();
        assert_eq!(cached, None, "{} should be gone after flush", key);
    }

    manager.release_connection(conn).unwrap();
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn end_to_end_manager_connection_cache_destroy_read() {
    init_logger();

    // create manager -> acquire connection
    let manager = RedisManager::create(&test_url(), ManagerOptions::default()).unwrap();
    let mut conn = manager.get_connection().await.unwrap();
    conn.flush_cache(FlushOptions { db: Some(15) }).await.unwrap();

    // cache "test1" = "testValue"
    conn.cache_value("test1", "testValue", None).await.unwrap();

    // destroy ["test1"] -> read "test1" -> not found
    conn.destroy_cached_values(&json!(["test1"])).await.unwrap();
    assert_eq!(conn.get_cached_value("test1").await.unwrap(), None);

    // read "nonexistingkey" -> not found
    assert_eq!(conn.get_cached_value("nonexistingkey").await.unwrap(), None);

    // release, then destroy the manager; neither step errors
    manager.release_connection(conn).unwrap();
    manager.destroy();
    assert_eq!(manager.open_connections(), 0);
}

#[tokio::test]
#[ignore]
async fn destroy_manager_releases_open_connections() {
    init_logger();

    let manager = RedisManager::create(&test_url(), ManagerOptions::default()).unwrap();
    let _conn_a = manager.get_connection().await.unwrap();
    let _conn_b = manager.get_connection().await.unwrap();
    assert_eq!(manager.open_connections(), 2);

    manager.destroy();
    assert_eq!(manager.open_connections(), 0);

    // Destroying again is harmless.
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn values_expire_after_their_ttl() {
    use std::time::Duration;

    let (manager, mut conn) = setup().await;

    conn.cache_value("ephemeral", "testValue", Some(Duration::from_secs(1)))
        .await
        .unwrap();
    assert_eq!(
        conn.get_cached_value("ephemeral").await.unwrap(),
        Some(json!("testValue"))
    );

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(conn.get_cached_value("ephemeral").await.unwrap(), None);

    manager.release_connection(conn).unwrap();
    manager.destroy();
}

#[tokio::test]
#[ignore]
async fn non_json_payloads_read_back_as_strings() {
    use redis::AsyncCommands;

    let (manager, mut conn) = setup().await;

    // Plant an entry written by something outside the driver family.
    let client = redis::Client::open(test_url().as_str()).unwrap();
    let mut raw_conn = client.get_multiplexed_tokio_connection().await.unwrap();
    let _: () = raw_conn.set("raw", "not json at all {{{").await.unwrap();

    let cached = conn.get_cached_value("raw").await.unwrap();
    assert_eq!(cached, Some(Value::String("not json at all {{{".to_string())));

    manager.release_connection(conn).unwrap();
    manager.destroy();
}
