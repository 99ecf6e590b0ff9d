//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use authguard::{
    routes, AppState, Config, HeaderMode, InMemoryAuthService, InMemoryStore, RateLimitConfig,
    RateLimiter,
};
use axum_test::TestServer;

/// Client address used by tests that don't care about identity
pub const TEST_IP: &str = "198.51.100.7";

/// Config for tests; the listener fields are unused by TestServer
pub fn test_config(
    max_requests: i64,
    window_seconds: u64,
    header_mode: HeaderMode,
) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        rate_limit_window_seconds: window_seconds,
        rate_limit_max_requests: max_requests,
        rate_limit_headers: header_mode,
        redis_url: None,
    }
}

/// Test server over an in-memory counter store and user store
pub fn test_server(max_requests: i64, window_seconds: u64, header_mode: HeaderMode) -> TestServer {
    let (server, _) = test_server_with_store(max_requests, window_seconds, header_mode);
    server
}

/// Like [`test_server`], but hands back the counter store so tests can
/// inspect stored counts directly
pub fn test_server_with_store(
    max_requests: i64,
    window_seconds: u64,
    header_mode: HeaderMode,
) -> (TestServer, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let limiter = Arc::new(RateLimiter::new(
        RateLimitConfig::new(max_requests, window_seconds, header_mode),
        store.clone(),
    ));
    let state = Arc::new(AppState::with_parts(
        test_config(max_requests, window_seconds, header_mode),
        limiter,
        Arc::new(InMemoryAuthService::new()),
    ));

    let server = TestServer::new(routes::create_router(state)).unwrap();
    (server, store)
}

/// Registration body with a unique-ish email per call site
pub fn register_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "John",
        "lastName": "Doe",
        "email": email,
        "password": "test@123",
        "location": "Mumbai"
    })
}
