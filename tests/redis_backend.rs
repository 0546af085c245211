//! Tests against a live Redis instance.
//!
//! Skipped unless `REDIS_URL` points at a disposable server, e.g.
//! `REDIS_URL=redis://127.0.0.1/ cargo test --test redis_backend`.
//!
//! These exercise what the in-memory backend cannot: the stored-state
//! tolerance of the Lua script. Keys holding foreign layouts (a plain
//! string, a hash without a `tat` field, a non-numeric `tat`) must behave
//! like fresh buckets and get replaced by the script's own layout on the
//! next conforming write.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fleet_ratelimit::{RedisStorage, Storage};
use redis::aio::MultiplexedConnection;

const PERIOD: Duration = Duration::from_secs(20);
const BURST: u32 = 4;

async fn harness() -> Option<(MultiplexedConnection, RedisStorage)> {
    let url = std::env::var("REDIS_URL").ok()?;
    let client = redis::Client::open(url.as_str()).expect("invalid REDIS_URL");
    let conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("redis unreachable");
    let storage = RedisStorage::connect(&url).await.expect("redis unreachable");
    Some((conn, storage))
}

/// A key no other test run has touched.
fn unique_key(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{tag}:{nanos}")
}

/// The documented storage namespace; raw writes in these tests plant
/// foreign state exactly where the script will look for it.
fn raw_key(key: &str) -> String {
    format!("rate-limit:{key}")
}

async fn drain_burst(storage: &RedisStorage, key: &str) {
    for i in 0..BURST {
        let result = storage.update(key, PERIOD, BURST, 1.0).await.unwrap();
        assert!(result.conforming, "draw {i} of {BURST} should conform");
    }
    let denied = storage.update(key, PERIOD, BURST, 1.0).await.unwrap();
    assert!(!denied.conforming, "draw past the burst should deny");
    assert!(denied.time_to_act > 0);
}

#[tokio::test]
async fn grants_exactly_the_burst_then_denies() {
    let Some((_, storage)) = harness().await else {
        return;
    };
    drain_burst(&storage, &unique_key("FreshBucket")).await;
}

#[tokio::test]
async fn wrong_typed_key_is_replaced_by_bucket_state() {
    let Some((mut conn, storage)) = harness().await else {
        return;
    };
    let key = unique_key("WrongTypedKey");

    // A plain string where the bucket hash should live; HGET on it raises
    // WRONGTYPE inside the script.
    let _: () = redis::cmd("SET")
        .arg(raw_key(&key))
        .arg("session-blob")
        .query_async(&mut conn)
        .await
        .unwrap();

    drain_burst(&storage, &key).await;

    // The foreign value is gone; the key now holds the bucket layout.
    let ty: String = redis::cmd("TYPE")
        .arg(raw_key(&key))
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(ty, "hash");
    let stored: String = redis::cmd("HGET")
        .arg(raw_key(&key))
        .arg("tat")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert!(stored.parse::<f64>().is_ok());
}

#[tokio::test]
async fn hash_without_tat_field_counts_as_idle() {
    let Some((mut conn, storage)) = harness().await else {
        return;
    };
    let key = unique_key("ForeignHash");

    let _: () = redis::cmd("HSET")
        .arg(raw_key(&key))
        .arg("count")
        .arg(42)
        .query_async(&mut conn)
        .await
        .unwrap();

    drain_burst(&storage, &key).await;
}

#[tokio::test]
async fn non_numeric_tat_counts_as_idle() {
    let Some((mut conn, storage)) = harness().await else {
        return;
    };
    let key = unique_key("CorruptTat");

    let _: () = redis::cmd("HSET")
        .arg(raw_key(&key))
        .arg("tat")
        .arg("garbage")
        .query_async(&mut conn)
        .await
        .unwrap();

    drain_burst(&storage, &key).await;

    // The corrupt value was overwritten with a parseable TAT.
    let stored: String = redis::cmd("HGET")
        .arg(raw_key(&key))
        .arg("tat")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert!(stored.parse::<f64>().is_ok());
}
