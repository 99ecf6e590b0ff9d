//! Redis-backed window counter store
//!
//! Shares counters across instances for multi-process deployments.
//! Uses an atomic INCR + EXPIRE pipeline on window-aligned keys so
//! independent instances agree on window boundaries.

use async_trait::async_trait;

use super::store::{CounterStore, WindowCount};
use crate::error::AppResult;

/// Generate the Redis key for a client's window counter
fn counter_key(prefix: &str, client_key: &str, window_index: i64) -> String {
    format!("{}:{}:{}", prefix, client_key, window_index)
}

/// Counter store backed by Redis
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Create a store using an established connection manager
    pub fn new(conn: redis::aio::ConnectionManager, key_prefix: &str) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.to_string(),
        }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn incr(
        &self,
        client_key: &str,
        now: i64,
        window_seconds: i64,
    ) -> AppResult<WindowCount> {
        let mut conn = self.conn.clone();

        // Windows are aligned to epoch buckets rather than per-client start
        // times, since plain INCR cannot record when a key first appeared.
        let window_index = now / window_seconds;
        let window_start = window_index * window_seconds;
        let key = counter_key(&self.key_prefix, client_key, window_index);

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1i64)
            .expire(&key, window_seconds * 2) // keep for 2 windows
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(WindowCount {
            count,
            window_start,
        })
    }
}
