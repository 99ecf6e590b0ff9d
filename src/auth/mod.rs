//! Registration and login collaborators
//!
//! The admission-control layer treats credential handling as opaque: it only
//! ever calls [`AuthService::register`] and [`AuthService::login`] on allowed
//! requests. [`InMemoryAuthService`] is the reference implementation backing
//! the server and the integration tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// User name
    pub name: String,
    /// User last name
    #[serde(default)]
    pub last_name: String,
    /// User email address
    pub email: String,
    /// User password (at least 6 characters)
    pub password: String,
    /// User location (city or country)
    #[serde(default)]
    pub location: String,
}

/// Login request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user, never carries the password
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
}

/// Response body for successful register/login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

/// Credential handling boundary
///
/// Implementations own validation, hashing and persistence. Invoked only on
/// requests the rate limiter has admitted.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse>;
    async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse>;
}

/// Stored user record
struct StoredUser {
    id: Uuid,
    name: String,
    last_name: String,
    email: String,
    location: String,
    password_hash: String,
}

impl StoredUser {
    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            name: self.name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            location: self.location.clone(),
        }
    }
}

/// In-memory user store keyed by lowercased email
pub struct InMemoryAuthService {
    users: RwLock<HashMap<String, StoredUser>>,
}

/// Hash a password for storage
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn validate_register(request: &RegisterRequest) -> AppResult<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if !EMAIL_RE.is_match(&request.email) {
        return Err(AppError::BadRequest(
            "email address is not valid".to_string(),
        ));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

impl InMemoryAuthService {
    /// Create an empty user store
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        validate_register(&request)?;

        let key = request.email.to_lowercase();
        let mut users = self.users.write().unwrap();
        if users.contains_key(&key) {
            return Err(AppError::EmailTaken(request.email));
        }

        let user = StoredUser {
            id: Uuid::new_v4(),
            name: request.name,
            last_name: request.last_name,
            email: request.email,
            location: request.location,
            password_hash: hash_password(&request.password),
        };
        let profile = user.profile();
        users.insert(key, user);

        Ok(AuthResponse {
            success: true,
            message: "User created successfully".to_string(),
            user: profile,
        })
    }

    async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let key = request.email.to_lowercase();
        let users = self.users.read().unwrap();

        let user = users.get(&key).ok_or(AppError::InvalidCredentials)?;
        if user.password_hash != hash_password(&request.password) {
            return Err(AppError::InvalidCredentials);
        }

        Ok(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
            user: user.profile(),
        })
    }
}
