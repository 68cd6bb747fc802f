//! # Authentication
//!
//! ```text
//! POST /api/auth/login
//!      │
//!      ├── customer: argon2 verify against each customer with that name
//!      └── admin:    compare with the configured admin account
//!      │
//!      ▼
//! JwtManager::expiry_from(now) ──► expires_at
//!      │
//!      ▼
//! SessionStore::start(.., expires_at) ──► jti
//!      │
//!      ▼
//! JWT { sub: username, role, jti, iat, exp }  ──► client
//!
//! Later requests: Authorization: Bearer <jwt>
//!      │
//!      ▼
//! CurrentUser extractor: signature + expiry ok AND jti still a live session
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use rxpro_core::Role;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Session id in the server's [`crate::state::SessionStore`]
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Expiry of a token issued at `issued_at`.
    pub fn expiry_from(&self, issued_at: DateTime<Utc>) -> ApiResult<DateTime<Utc>> {
        Duration::try_seconds(self.lifetime_secs)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| ApiError::internal("Token lifetime out of range"))
    }

    /// Signs a token for a session that ends at `expires_at`.
    pub fn generate_token(
        &self,
        username: &str,
        role: Role,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> ApiResult<String> {
        let claims = Claims {
            sub: username.to_string(),
            role,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            jti: session_id.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim)
}

// =============================================================================
// Passwords
// =============================================================================

/// Hashes a password into a PHC string.
pub fn hash_password(password: &str) -> ApiResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractors
// =============================================================================

/// The caller behind a valid bearer token with a live session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
    pub session_id: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = state.jwt.validate_token(token)?;

        match state.sessions.identity(&claims.jti) {
            Some((username, role)) if username == claims.sub && role == claims.role => {
                Ok(CurrentUser {
                    username,
                    role,
                    session_id: claims.jti,
                })
            }
            _ => Err(ApiError::unauthorized("Session has ended, please log in again")),
        }
    }
}

/// A logged-in customer.
#[derive(Debug, Clone)]
pub struct CustomerUser(pub CurrentUser);

impl FromRequestParts<AppState> for CustomerUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Customer {
            return Err(ApiError::forbidden("Customer login required"));
        }
        Ok(CustomerUser(user))
    }
}

/// A logged-in administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::forbidden("Admin login required"));
        }
        Ok(AdminUser(user))
    }
}
