//! Shared fixtures for handler tests: an in-memory database, a recording
//! inference backend and request helpers over `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rxpro_db::{Database, DbConfig};
use rxpro_inference::{InferenceBackend, InferenceError, InferenceRequest, InferenceResult};

use crate::config::ServerConfig;
use crate::routes::router;
use crate::state::AppState;

/// Remembers every request; answers with a fixed prefix or fails.
#[derive(Default)]
pub struct RecordingBackend {
    pub seen: Mutex<Vec<InferenceRequest>>,
    pub fail: bool,
}

#[async_trait]
impl InferenceBackend for RecordingBackend {
    async fn analyze(&self, req: &InferenceRequest) -> InferenceResult<String> {
        self.seen.lock().unwrap().push(req.clone());
        if self.fail {
            return Err(InferenceError::Status {
                code: 503,
                body: "model overloaded".to_string(),
            });
        }
        Ok(format!("Reviewed: {}", req.rx_text))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backend: Arc<RecordingBackend>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(RecordingBackend::default()).await
    }

    pub async fn with_failing_inference() -> Self {
        Self::build(RecordingBackend {
            fail: true,
            ..Default::default()
        })
        .await
    }

    async fn build(backend: RecordingBackend) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "test-secret".to_string();

        let backend = Arc::new(backend);
        let state = AppState::new(db, config, backend.clone());

        TestApp {
            router: router(state.clone()),
            state,
            backend,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        json_of(self.request(Method::GET, uri, token, None).await).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        json_of(self.request(Method::POST, uri, token, Some(body)).await).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        json_of(self.request(Method::PUT, uri, token, Some(body)).await).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        json_of(self.request(Method::DELETE, uri, token, None).await).await
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/signup",
            None,
            json!({
                "name": name,
                "password": password,
                "confirm_password": password,
                "email": email,
                "branch": "Kochi",
                "phone": "+91 98470 12345",
            }),
        )
        .await
    }

    pub async fn login(&self, role: &str, username: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/login",
            None,
            json!({ "role": role, "username": username, "password": password }),
        )
        .await
    }

    /// Signs a customer up and returns a bearer token.
    pub async fn customer(&self, name: &str) -> String {
        let (status, _) = self
            .signup(name, &format!("{}@example.com", name), "pw-1234")
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.login("customer", name, "pw-1234").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Logs in with the default admin account.
    pub async fn admin(&self) -> String {
        let (status, body) = self.login("admin", "admin", "admin").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn add_to_cart(&self, token: &str, name: &str, quantity: i64, cents: i64) {
        let (status, _) = self
            .post(
                "/api/cart/items",
                Some(token),
                json!({ "name": name, "quantity": quantity, "unit_price_cents": cents }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Status plus JSON body (`Null` when the body is empty).
pub async fn json_of(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
