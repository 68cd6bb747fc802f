//! Signup, login and logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use rxpro_core::validation::{
    validate_customer_name, validate_email, validate_phone, validate_signup_passwords,
};
use rxpro_core::{Customer, CustomerProfile, Role};

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub role: Role,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<CustomerProfile>)> {
    validate_signup_passwords(&req.password, &req.confirm_password)?;

    let name = req.name.trim();
    validate_customer_name(name)?;
    validate_email(&req.email)?;
    let phone = req.phone.trim();
    if !phone.is_empty() {
        validate_phone(phone)?;
    }

    let customer = Customer {
        email: req.email.trim().to_string(),
        name: name.to_string(),
        password_hash: hash_password(&req.password)?,
        branch: req.branch.trim().to_string(),
        phone: phone.to_string(),
        created_at: Utc::now(),
    };

    state.db.customers().insert(&customer).await?;
    info!(name = %customer.name, "Customer registered");

    Ok((StatusCode::CREATED, Json(CustomerProfile::from(customer))))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let username = req.username.trim();

    let authenticated = match req.role {
        Role::Admin => {
            let auth = &state.config.auth;
            username == auth.admin_username && req.password == auth.admin_password
        }
        Role::Customer => state
            .db
            .customers()
            .find_by_name(username)
            .await?
            .iter()
            .any(|c| verify_password(&req.password, &c.password_hash)),
    };

    if !authenticated {
        warn!(role = %req.role, username, "Failed login");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let expires_at = state.jwt.expiry_from(Utc::now())?;
    let session_id = state.sessions.start(username, req.role, expires_at);
    let token = state
        .jwt
        .generate_token(username, req.role, &session_id, expires_at)?;
    info!(role = %req.role, username, "Logged in");

    Ok(Json(LoginResponse {
        token,
        role: req.role,
        username: username.to_string(),
    }))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> StatusCode {
    state.sessions.end(&user.session_id);
    info!(username = %user.username, "Logged out");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_signup_and_login() {
        let app = TestApp::new().await;

        let (status, body) = app.signup("asha", "asha@example.com", "pw-1234").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "asha");
        assert!(body.get("password_hash").is_none());

        let (status, body) = app.login("customer", "asha", "pw-1234").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "customer");
        assert!(body["token"].as_str().unwrap().len() > 20);
    }

    #[tokio::test]
    async fn test_password_mismatch() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post(
                "/api/auth/signup",
                None,
                json!({
                    "name": "asha",
                    "password": "one",
                    "confirm_password": "two",
                    "email": "asha@example.com",
                }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Passwords do not match!");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let app = TestApp::new().await;
        app.signup("asha", "asha@example.com", "pw").await;

        let (status, body) = app.signup("asha2", "asha@example.com", "pw").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let app = TestApp::new().await;
        app.signup("asha", "asha@example.com", "pw-1234").await;

        let (status, body) = app.login("customer", "asha", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, _) = app.login("admin", "admin", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.login("customer", "nobody", "pw-1234").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let app = TestApp::new().await;
        let token = app.customer("asha").await;

        let (status, _) = app.get("/api/cart", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.post("/api/auth/logout", Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.get("/api/cart", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(app.state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_token() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/cart", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}
