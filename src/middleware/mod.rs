//! Middleware module
//!
//! Contains Tower middleware for per-client rate limiting.

pub mod rate_limiter;
