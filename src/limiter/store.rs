//! In-process window counter store
//!
//! Keeps per-client window counters in a mutex-guarded map so the
//! read-modify-write of a counter never races between request workers.
//! Stale entries are pruned lazily while the lock is already held.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppResult;

/// Counter snapshot returned by a store after an increment
#[derive(Debug, Clone, Copy)]
pub struct WindowCount {
    /// Post-increment request count for the window
    pub count: i64,
    /// Unix timestamp at which the window opened
    pub window_start: i64,
}

/// Storage backend for per-client window counters
///
/// Implementations must make the increment atomic per client key so
/// concurrent requests from one client never lose updates.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter for `client_key`, opening a fresh window when
    /// the previous one has elapsed. Returns the post-increment state.
    async fn incr(
        &self,
        client_key: &str,
        now: i64,
        window_seconds: i64,
    ) -> AppResult<WindowCount>;
}

/// Per-client window state
#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: i64,
    window_start: i64,
}

struct Inner {
    entries: HashMap<String, WindowState>,
    last_sweep: i64,
}

/// In-memory counter store
///
/// The default backend: a single process owns all counters. Entries for
/// clients that stopped sending requests are swept at most once per window,
/// after they have been idle for a full window beyond their own.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                last_sweep: 0,
            }),
        }
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Stored count for a client, if tracked
    pub fn count_for(&self, client_key: &str) -> Option<i64> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .get(client_key)
            .map(|e| e.count)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryStore {
    async fn incr(
        &self,
        client_key: &str,
        now: i64,
        window_seconds: i64,
    ) -> AppResult<WindowCount> {
        let mut inner = self.inner.lock().unwrap();

        let entry = inner
            .entries
            .entry(client_key.to_string())
            .or_insert(WindowState {
                count: 0,
                window_start: now,
            });

        if now >= entry.window_start + window_seconds {
            entry.count = 0;
            entry.window_start = now;
        }
        entry.count += 1;

        let snapshot = WindowCount {
            count: entry.count,
            window_start: entry.window_start,
        };

        // Sweep entries idle for more than a full window past their own.
        // Never required for correctness, only for bounded memory.
        if now - inner.last_sweep >= window_seconds {
            inner
                .entries
                .retain(|_, e| now < e.window_start + 2 * window_seconds);
            inner.last_sweep = now;
        }

        Ok(snapshot)
    }
}
