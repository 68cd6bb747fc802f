//! # Application State
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState (cloned into every handler)                                   │
//! │                                                                         │
//! │  db          Database          SQLite pool + repositories              │
//! │  sessions    SessionStore      jti → { username, role, cart }          │
//! │  jwt         JwtManager        signs / checks bearer tokens            │
//! │  inference   dyn Backend       Gemini in production                    │
//! │  config      ServerConfig      store branding, admin account, ...      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Carts live only in memory, keyed by the session a login created. Logging
//! out, token expiry or a restart drops them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use rxpro_core::{Cart, Role};
use rxpro_db::Database;
use rxpro_inference::InferenceBackend;

use crate::auth::JwtManager;
use crate::config::ServerConfig;

/// One logged-in user.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub cart: Cart,
    pub started_at: DateTime<Utc>,
    /// Same instant as the token's `exp`.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-memory sessions keyed by the token's `jti`.
///
/// Uses `Arc<Mutex<..>>` so clones of the state share one map. The lock is
/// never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // A panic while holding the lock leaves plain data behind; keep serving.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a session with an empty cart and returns its id. Expired
    /// sessions are dropped on the way.
    pub fn start(&self, username: &str, role: Role, expires_at: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let swept = before - sessions.len();
        if swept > 0 {
            debug!(swept, "Dropped expired sessions");
        }

        sessions.insert(
            id.clone(),
            Session {
                username: username.to_string(),
                role,
                cart: Cart::new(),
                started_at: now,
                expires_at,
            },
        );
        debug!(%role, username, "Session started");
        id
    }

    /// Username and role of a live session. An expired session is removed.
    pub fn identity(&self, id: &str) -> Option<(String, Role)> {
        let mut sessions = self.lock();
        match sessions.get(id) {
            Some(s) if s.is_expired(Utc::now()) => {
                sessions.remove(id);
                debug!("Session expired");
                None
            }
            Some(s) => Some((s.username.clone(), s.role)),
            None => None,
        }
    }

    /// Ends a session. Returns false if it was already gone.
    pub fn end(&self, id: &str) -> bool {
        let removed = self.lock().remove(id).is_some();
        if !removed {
            warn!("Logout for unknown session");
        }
        removed
    }

    /// Runs `f` with read access to the session's cart.
    pub fn with_cart<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Cart) -> R,
    {
        let now = Utc::now();
        self.lock()
            .get(id)
            .filter(|s| !s.is_expired(now))
            .map(|s| f(&s.cart))
    }

    /// Runs `f` with write access to the session's cart.
    pub fn with_cart_mut<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let now = Utc::now();
        self.lock()
            .get_mut(id)
            .filter(|s| !s.is_expired(now))
            .map(|s| f(&mut s.cart))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub jwt: Arc<JwtManager>,
    pub inference: Arc<dyn InferenceBackend>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Builds the state. An empty `auth.jwt_secret` gets a random
    /// per-process secret.
    pub fn new(db: Database, config: ServerConfig, inference: Arc<dyn InferenceBackend>) -> Self {
        let secret = if config.auth.jwt_secret.is_empty() {
            warn!("No jwt_secret configured; tokens will not survive a restart");
            format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
        } else {
            config.auth.jwt_secret.clone()
        };

        AppState {
            db,
            sessions: SessionStore::new(),
            jwt: Arc::new(JwtManager::new(secret, config.auth.token_lifetime_secs)),
            inference,
            config: Arc::new(config),
        }
    }
}
