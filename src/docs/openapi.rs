//! OpenAPI specification for the Authguard API
//!
//! Aggregates the auth endpoints and schemas into a single OpenAPI document.

use utoipa::OpenApi;

use crate::auth::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::error::{ErrorBody, ErrorDetails, ErrorResponse};

/// OpenAPI specification for the Authguard API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Authguard API",
        version = "1.0.0",
        description = "Authentication APIs for registering and logging in users, guarded by per-client rate limiting"
    ),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UserProfile,
            AuthResponse,
            ErrorDetails,
            ErrorBody,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Authentication APIs")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_contains_auth_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/v1/auth/register"));
        assert!(spec.paths.paths.contains_key("/api/v1/auth/login"));
    }
}
