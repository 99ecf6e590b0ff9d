//! Auth endpoint integration tests
//!
//! Register/login behavior over the real router, plus the public
//! surfaces (health probes, metrics, OpenAPI docs).

mod common;

use authguard::HeaderMode;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use common::{register_body, test_server, TEST_IP};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn server() -> TestServer {
    test_server(100, 900, HeaderMode::Standard)
}

fn from_test_ip(
    server: &TestServer,
    path: &str,
) -> axum_test::TestRequest {
    server.post(path).add_header(
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(TEST_IP),
    )
}

#[tokio::test]
async fn test_register_creates_user() {
    let server = server();

    let response = from_test_ip(&server, "/api/v1/auth/register")
        .json(&register_body("johndoe@gmail.com"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["name"], "John");
    assert_eq!(body["user"]["lastName"], "Doe");
    assert_eq!(body["user"]["email"], "johndoe@gmail.com");
    assert_eq!(body["user"]["location"], "Mumbai");
    assert!(body["user"]["id"].is_string());
    // Password never appears in responses
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let server = server();

    from_test_ip(&server, "/api/v1/auth/register")
        .json(&register_body("johndoe@gmail.com"))
        .await;

    let duplicate = from_test_ip(&server, "/api/v1/auth/register")
        .json(&register_body("johndoe@gmail.com"))
        .await;

    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    let body: Value = duplicate.json();
    assert_eq!(body["error"]["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn test_register_validates_input() {
    let server = server();

    let bad_email = register_body("not-an-email");
    let response = from_test_ip(&server, "/api/v1/auth/register")
        .json(&bad_email)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let mut short_password = register_body("a@b.com");
    short_password["password"] = json!("12345");
    let response = from_test_ip(&server, "/api/v1/auth/register")
        .json(&short_password)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let server = server();

    let response = from_test_ip(&server, "/api/v1/auth/register")
        .json(&json!({ "email": "a@b.com" }))
        .await;

    // axum's Json extractor rejects the body before the handler runs
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_roundtrip() {
    let server = server();

    from_test_ip(&server, "/api/v1/auth/register")
        .json(&register_body("johndoe@gmail.com"))
        .await;

    let response = from_test_ip(&server, "/api/v1/auth/login")
        .json(&json!({ "email": "johndoe@gmail.com", "password": "test@123" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "johndoe@gmail.com");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let server = server();

    from_test_ip(&server, "/api/v1/auth/register")
        .json(&register_body("johndoe@gmail.com"))
        .await;

    let wrong_password = from_test_ip(&server, "/api/v1/auth/login")
        .json(&json!({ "email": "johndoe@gmail.com", "password": "nope@123" }))
        .await;
    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = wrong_password.json();
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    let unknown_user = from_test_ip(&server, "/api/v1/auth/login")
        .json(&json!({ "email": "nobody@nowhere.com", "password": "test@123" }))
        .await;
    assert_eq!(unknown_user.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_probes() {
    let server = server();

    for path in ["/health", "/health/ready", "/health/live"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }
}

#[tokio::test]
async fn test_openapi_document_lists_auth_paths() {
    let server = server();

    let response = server.get("/docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let spec: Value = response.json();
    assert!(spec["paths"]["/api/v1/auth/register"]["post"].is_object());
    assert!(spec["paths"]["/api/v1/auth/login"]["post"].is_object());
    assert_eq!(spec["info"]["title"], "Authguard API");
}

#[tokio::test]
async fn test_metrics_count_failed_requests_by_status() {
    let server = server();

    // First scrape installs the recorder so later increments are captured
    let response = server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // A denied login must show up in the request counter alongside its status
    let response = from_test_ip(&server, "/api/v1/auth/login")
        .json(&json!({ "email": "nobody@nowhere.com", "password": "test@123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let rendered = server.get("/metrics").await.text();
    assert!(rendered.contains("authguard_requests_total"));
    assert!(rendered.contains("endpoint=\"login\""));
    assert!(rendered.contains("status=\"401\""));
}
