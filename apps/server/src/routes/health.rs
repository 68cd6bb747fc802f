//! Liveness check.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    /// Embedded migrations not yet recorded as applied.
    pub pending_migrations: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.db.health_check().await;
    let pending_migrations = match state.db.migration_status().await {
        Ok((embedded, applied)) => embedded.saturating_sub(applied),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            0
        }
    };

    Json(HealthResponse {
        status: if database && pending_migrations == 0 { "ok" } else { "degraded" },
        database,
        pending_migrations,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
        assert_eq!(body["pending_migrations"], 0);
    }

    #[tokio::test]
    async fn test_health_degraded_when_database_closed() {
        let app = TestApp::new().await;
        app.state.db.close().await;

        let (status, body) = app.get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], false);
    }
}
