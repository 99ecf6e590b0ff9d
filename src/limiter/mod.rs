//! Per-client admission control
//!
//! Fixed-window request counting keyed by client identity. The counter is
//! incremented before the threshold comparison, so the stored count keeps
//! advancing on denied requests and may exceed the configured maximum;
//! window-boundary retry math stays correct either way.

pub mod redis;
pub mod store;

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};

use crate::error::AppResult;
use self::store::CounterStore;

/// Which rate limit metadata headers are emitted to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Draft-standard `RateLimit-*` headers
    Standard,
    /// Legacy `X-RateLimit-*` headers
    Legacy,
    /// No rate limit headers at all
    None,
}

impl FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "legacy" => Ok(Self::Legacy),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown header mode '{}' (expected standard, legacy or none)",
                other
            )),
        }
    }
}

/// Rate limit configuration, fixed at construction
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: i64,
    /// Window size in seconds
    pub window_seconds: u64,
    /// Header emission mode
    pub header_mode: HeaderMode,
}

impl RateLimitConfig {
    /// Create a new rate limit config
    pub fn new(max_requests: i64, window_seconds: u64, header_mode: HeaderMode) -> Self {
        Self {
            max_requests,
            window_seconds,
            header_mode,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 900,
            header_mode: HeaderMode::Standard,
        }
    }
}

/// Outcome of an admission check
///
/// Denial is a regular value here, never an error; the caller decides how
/// to surface it.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests allowed in window
    pub limit: i64,
    /// Remaining requests in current window (negative once over the limit)
    pub remaining: i64,
    /// Unix timestamp when the window resets
    pub reset_at: i64,
    /// Stored request count, including this request
    pub current: i64,
    /// Seconds until the window resets; set only on denial
    pub retry_after: Option<i64>,
}

impl RateLimitResult {
    /// Rate limit headers for the response, per the configured mode
    pub fn headers(&self, mode: HeaderMode) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = match mode {
            HeaderMode::Standard => vec![
                (
                    HeaderName::from_static("ratelimit-limit"),
                    HeaderValue::from_str(&self.limit.to_string()).unwrap(),
                ),
                (
                    HeaderName::from_static("ratelimit-remaining"),
                    HeaderValue::from_str(&self.remaining.max(0).to_string()).unwrap(),
                ),
                (
                    // Seconds until reset, per the draft standard
                    HeaderName::from_static("ratelimit-reset"),
                    HeaderValue::from_str(&self.seconds_until_reset().to_string()).unwrap(),
                ),
            ],
            HeaderMode::Legacy => vec![
                (
                    HeaderName::from_static("x-ratelimit-limit"),
                    HeaderValue::from_str(&self.limit.to_string()).unwrap(),
                ),
                (
                    HeaderName::from_static("x-ratelimit-remaining"),
                    HeaderValue::from_str(&self.remaining.max(0).to_string()).unwrap(),
                ),
                (
                    // Unix epoch of the reset, as legacy clients expect
                    HeaderName::from_static("x-ratelimit-reset"),
                    HeaderValue::from_str(&self.reset_at.to_string()).unwrap(),
                ),
            ],
            HeaderMode::None => return Vec::new(),
        };

        if !self.allowed {
            let retry_after = self
                .retry_after
                .unwrap_or_else(|| self.seconds_until_reset().max(1));
            headers.push((
                header::RETRY_AFTER,
                HeaderValue::from_str(&retry_after.to_string()).unwrap(),
            ));
        }

        headers
    }

    fn seconds_until_reset(&self) -> i64 {
        (self.reset_at - chrono::Utc::now().timestamp()).max(0)
    }
}

/// Admission controller for per-client request quotas
///
/// The counter store is injected so tests can drive it directly and
/// deployments can swap the in-memory map for a shared Redis backend.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    /// Create a limiter over the given store
    pub fn new(config: RateLimitConfig, store: Arc<dyn CounterStore>) -> Self {
        Self { config, store }
    }

    /// The limiter's configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Decide whether a request from `client_key` may proceed
    pub async fn check(&self, client_key: &str) -> AppResult<RateLimitResult> {
        self.check_at(client_key, chrono::Utc::now().timestamp())
            .await
    }

    /// Clock-injected variant of [`check`](Self::check)
    pub async fn check_at(&self, client_key: &str, now: i64) -> AppResult<RateLimitResult> {
        let window_seconds = self.config.window_seconds as i64;
        let window = self.store.incr(client_key, now, window_seconds).await?;

        let reset_at = window.window_start + window_seconds;
        let allowed = window.count <= self.config.max_requests;
        let retry_after = if allowed {
            None
        } else {
            Some((reset_at - now).max(1))
        };

        Ok(RateLimitResult {
            allowed,
            limit: self.config.max_requests,
            remaining: self.config.max_requests - window.count,
            reset_at,
            current: window.count,
            retry_after,
        })
    }
}
