//! # RxPro Server
//!
//! ```text
//! rxpro-server [--config <path>]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rxpro_db::Database;
use rxpro_inference::GeminiClient;
use rxpro_server::{init_tracing, router, shutdown_signal, AppState, ServerConfig};

fn config_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => return args.next().map(PathBuf::from),
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::load(config_arg()).context("loading configuration")?;

    info!(
        store = %config.store.name,
        db = %config.database.path.display(),
        "Starting RxPro server..."
    );

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let db = Database::new(config.database.db_config())
        .await
        .context("opening database")?;
    info!("Database ready");

    if !config.inference.has_api_key() {
        warn!("GEMINI_API_KEY is not set; RX analysis will report a failure");
    }
    let inference = GeminiClient::new(config.inference.gemini_config())
        .context("building inference client")?;

    let addr = config.server.bind_address();
    let state = AppState::new(db.clone(), config, Arc::new(inference));
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}
