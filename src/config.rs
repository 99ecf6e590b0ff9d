//! Configuration management for Authguard
//!
//! Configuration is loaded from environment variables.

use anyhow::{anyhow, bail, Context, Result};
use std::env;

use crate::limiter::HeaderMode;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Length of the rate limit counting window (in seconds)
    pub rate_limit_window_seconds: u64,
    /// Maximum requests allowed per client per window
    pub rate_limit_max_requests: i64,
    /// Which rate limit metadata headers to emit
    pub rate_limit_headers: HeaderMode,

    /// Optional Redis URL; when set, window counters are shared across
    /// instances instead of kept in process memory
    pub redis_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: env::var("AUTHGUARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("AUTHGUARD_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid AUTHGUARD_PORT")?,

            rate_limit_window_seconds: env::var("RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_WINDOW_SECONDS")?,
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_MAX_REQUESTS")?,
            rate_limit_headers: env::var("RATE_LIMIT_HEADERS")
                .unwrap_or_else(|_| "standard".to_string())
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("Invalid RATE_LIMIT_HEADERS")?,

            redis_url: env::var("REDIS_URL").ok(),
        };

        // A zero window would make the counter math meaningless (the Redis
        // store divides by it); a non-positive maximum would deny everything.
        if config.rate_limit_window_seconds == 0 {
            bail!("RATE_LIMIT_WINDOW_SECONDS must be greater than zero");
        }
        if config.rate_limit_max_requests <= 0 {
            bail!("RATE_LIMIT_MAX_REQUESTS must be greater than zero");
        }

        Ok(config)
    }
}
