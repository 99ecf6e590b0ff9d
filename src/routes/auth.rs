//! Authentication endpoints
//!
//! Register and login handlers. Both sit behind the rate limiting
//! middleware and delegate credential handling to the configured
//! [`AuthService`](crate::auth::AuthService).

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::{
    auth::{AuthResponse, LoginRequest, RegisterRequest},
    error::AppResult,
    routes::metrics::record_request,
    AppState,
};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request body", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let result = state.auth.register(request).await;
    record_request("register", &outcome_status(&result));

    let response = result?;
    info!(user_id = %response.user.id, "User registered");
    Ok(Json(response))
}

/// Log in an existing user
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let result = state.auth.login(request).await;
    record_request("login", &outcome_status(&result));

    let response = result?;
    info!(user_id = %response.user.id, "User logged in");
    Ok(Json(response))
}

/// Status label for the request counter, covering error outcomes too
fn outcome_status(result: &AppResult<AuthResponse>) -> String {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    status.as_u16().to_string()
}
