//! Authguard - authentication API with per-client admission control
//!
//! This library provides the core functionality for the Authguard server:
//! register/login endpoints guarded by a fixed-window rate limiter keyed by
//! client identity, with OpenAPI documentation for the exposed routes.

pub mod auth;
pub mod config;
pub mod docs;
pub mod error;
pub mod limiter;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::auth::{AuthService, InMemoryAuthService};
pub use crate::config::Config;
pub use crate::limiter::redis::RedisStore;
pub use crate::limiter::store::{CounterStore, InMemoryStore};
pub use crate::limiter::{HeaderMode, RateLimitConfig, RateLimiter};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    /// Admission controller for the auth endpoints
    pub limiter: Arc<RateLimiter>,
    /// Credential handling collaborator, invoked only on allowed requests
    pub auth: Arc<dyn AuthService>,
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    ///
    /// Picks the counter store from configuration: Redis when `REDIS_URL`
    /// is set (shared across instances), the in-process map otherwise.
    pub async fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn CounterStore> = match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                let conn = redis::aio::ConnectionManager::new(client).await?;
                Arc::new(RedisStore::new(conn, "authguard:ratelimit"))
            }
            None => Arc::new(InMemoryStore::new()),
        };

        let limiter = Arc::new(RateLimiter::new(
            RateLimitConfig::new(
                config.rate_limit_max_requests,
                config.rate_limit_window_seconds,
                config.rate_limit_headers,
            ),
            store,
        ));

        let auth: Arc<dyn AuthService> = Arc::new(InMemoryAuthService::new());

        Ok(Self {
            config,
            limiter,
            auth,
            start_time: Instant::now(),
        })
    }

    /// Create application state from explicit collaborators
    ///
    /// Lets callers inject the limiter (and thus its store) and the auth
    /// backend; integration tests build their state this way.
    pub fn with_parts(
        config: Config,
        limiter: Arc<RateLimiter>,
        auth: Arc<dyn AuthService>,
    ) -> Self {
        Self {
            config,
            limiter,
            auth,
            start_time: Instant::now(),
        }
    }
}
