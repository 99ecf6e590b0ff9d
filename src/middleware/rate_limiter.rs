//! Rate limiting middleware
//!
//! Admission control in front of the guarded handlers: derives a client key
//! from the request, consults the limiter, and only runs the downstream
//! handler on an allow. Denials become 429 responses; the handler is never
//! invoked for them.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{AppError, ErrorBody, ErrorDetails, ErrorResponse},
    limiter::{HeaderMode, RateLimitResult},
    routes::metrics::record_decision,
    AppState,
};

/// Derive the client key for rate limiting
///
/// Prefers the first address in `X-Forwarded-For` (requests arriving through
/// a proxy), falling back to the peer address. Best-effort identity: not
/// globally unique across proxies.
pub fn client_key(request: &Request) -> Option<String> {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
}

/// Build a 429 Too Many Requests response with rate limit headers
pub fn rate_limit_exceeded_response(result: &RateLimitResult, mode: HeaderMode) -> Response {
    let error_response = ErrorResponse {
        error: ErrorBody {
            code: "RATE_LIMIT_EXCEEDED".to_string(),
            message: "Too many requests. Please slow down.".to_string(),
            details: Some(ErrorDetails {
                limit: Some(result.limit),
                used: Some(result.current),
                remaining: Some(result.remaining.max(0)),
                reset_at: Some(
                    chrono::DateTime::from_timestamp(result.reset_at, 0)
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_else(|| result.reset_at.to_string()),
                ),
            }),
        },
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(error_response)).into_response();

    let headers = response.headers_mut();
    for (name, value) in result.headers(mode) {
        headers.insert(name, value);
    }

    response
}

/// Rate limiting middleware
///
/// Checks the per-client quota before processing requests. Returns 429 when
/// exceeded and attaches quota headers to allowed responses per the
/// configured header mode.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    // No derivable identity is a caller-side precondition failure; the
    // limiter itself is never consulted.
    let Some(key) = client_key(&request) else {
        return AppError::InvalidClientKey.into_response();
    };

    let mode = state.limiter.config().header_mode;

    match state.limiter.check(&key).await {
        Ok(result) => {
            if !result.allowed {
                tracing::warn!(
                    client_key = %key,
                    limit = result.limit,
                    current = result.current,
                    "Rate limit exceeded"
                );
                record_decision("deny");
                return rate_limit_exceeded_response(&result, mode);
            }

            record_decision("allow");
            let mut response = next.run(request).await;

            let headers = response.headers_mut();
            for (name, value) in result.headers(mode) {
                headers.insert(name, value);
            }

            response
        }
        Err(e) => {
            // Log error but allow request through (fail open)
            tracing::error!(error = %e, "Rate limit check failed");
            next.run(request).await
        }
    }
}
