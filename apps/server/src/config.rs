//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RXPRO_PORT=9000                                                    │
//! │     GEMINI_API_KEY=...                                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path> or RXPRO_CONFIG                                    │
//! │     else ~/.config/rxpro-pos/rxpro.toml (Linux)                        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/rxpro/rxpro.db"
//! max_connections = 5
//! acquire_timeout_secs = 30
//!
//! [store]
//! name = "KAMPS Royal Pharmacy"
//! currency_symbol = "₹"
//!
//! [auth]
//! jwt_secret = "change-me"
//! token_lifetime_secs = 28800
//! admin_username = "admin"
//! admin_password = "admin"
//!
//! [inference]
//! model = "gemini-2.5-pro"
//! timeout_secs = 60
//! ```
//!
//! The inference API key is read from `GEMINI_API_KEY` (or the file). It has
//! no default and never appears in source.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use rxpro_core::ReceiptOptions;
use rxpro_db::{pool, DbConfig};
use rxpro_inference::GeminiConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// SQLite location and pool sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "rxpro", "pos")
}

fn default_db_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("rxpro.db"))
        .unwrap_or_else(|| PathBuf::from("rxpro.db"))
}

fn default_max_connections() -> u32 {
    pool::DEFAULT_MAX_CONNECTIONS
}

fn default_min_connections() -> u32 {
    pool::DEFAULT_MIN_CONNECTIONS
}

fn default_acquire_timeout() -> u64 {
    pool::DEFAULT_ACQUIRE_TIMEOUT.as_secs()
}

fn default_idle_timeout() -> u64 {
    pool::DEFAULT_IDLE_TIMEOUT.as_secs()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl DatabaseSettings {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.path.clone())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
    }
}

/// Store branding printed on receipts and reports.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_receipt_footer")]
    pub receipt_footer: Vec<String>,
}

fn default_store_name() -> String {
    ReceiptOptions::default().store_name
}

fn default_currency_symbol() -> String {
    ReceiptOptions::default().currency_symbol
}

fn default_receipt_footer() -> Vec<String> {
    ReceiptOptions::default().footer
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
            receipt_footer: default_receipt_footer(),
        }
    }
}

impl StoreSettings {
    pub fn receipt_options(&self) -> ReceiptOptions {
        ReceiptOptions {
            store_name: self.name.clone(),
            currency_symbol: self.currency_symbol.clone(),
            footer: self.receipt_footer.clone(),
        }
    }
}

/// Tokens and the built-in admin account.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret. Empty means a random per-process secret, so
    /// tokens do not survive a restart.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

/// Thirty days.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

fn default_token_lifetime() -> i64 {
    8 * 60 * 60
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: String::new(),
            token_lifetime_secs: default_token_lifetime(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_inference_timeout() -> u64 {
    60
}

impl Default for InferenceSettings {
    fn default() -> Self {
        InferenceSettings {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_inference_timeout(),
        }
    }
}

impl InferenceSettings {
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub inference: InferenceSettings,
}

impl ServerConfig {
    /// Loads defaults, then the TOML file, then environment overrides, and
    /// validates the result.
    ///
    /// The file is `config_path`, else `RXPRO_CONFIG`, else `rxpro.toml` in
    /// the platform config directory. A missing file is not an error.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("RXPRO_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        if self.auth.token_lifetime_secs <= 0
            || self.auth.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS
        {
            return Err(ConfigError::Invalid(format!(
                "auth.token_lifetime_secs must be between 1 and {}",
                MAX_TOKEN_LIFETIME_SECS
            )));
        }

        let db = &self.database;
        if db.max_connections == 0 || db.min_connections > db.max_connections {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1 and not below min_connections".into(),
            ));
        }

        if db.acquire_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "database.acquire_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.auth.admin_username.trim().is_empty() || self.auth.admin_password.is_empty() {
            return Err(ConfigError::Invalid(
                "auth.admin_username and auth.admin_password must be set".into(),
            ));
        }

        let endpoint = &self.inference.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "inference.endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        if self.inference.model.trim().is_empty() {
            return Err(ConfigError::Invalid("inference.model must not be empty".into()));
        }

        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "inference.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("RXPRO_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("RXPRO_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring unparseable RXPRO_PORT"),
            }
        }

        if let Some(path) = lookup("RXPRO_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(name) = lookup("RXPRO_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(symbol) = lookup("RXPRO_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }

        if let Some(secret) = lookup("RXPRO_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(username) = lookup("RXPRO_ADMIN_USERNAME") {
            self.auth.admin_username = username;
        }

        if let Some(password) = lookup("RXPRO_ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }

        if let Some(model) = lookup("RXPRO_INFERENCE_MODEL") {
            debug!(model = %model, "Overriding inference model from environment");
            self.inference.model = model;
        }

        if let Some(endpoint) = lookup("RXPRO_INFERENCE_ENDPOINT") {
            self.inference.endpoint = endpoint;
        }

        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.inference.api_key = Some(key);
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("rxpro.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.name, "KAMPS Royal Pharmacy");
        assert_eq!(config.inference.model, "gemini-2.5-pro");
        assert!(!config.inference.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [store]
            name = "Royal Pharmacy Kochi"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.store.name, "Royal Pharmacy Kochi");
        assert_eq!(config.store.currency_symbol, "₹");
        assert_eq!(config.auth.admin_username, "admin");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("RXPRO_PORT", "9100"),
            ("RXPRO_STORE_NAME", "Test Pharmacy"),
            ("RXPRO_ADMIN_PASSWORD", "s3cret"),
            ("GEMINI_API_KEY", "key-from-env"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.store.name, "Test Pharmacy");
        assert_eq!(config.auth.admin_password, "s3cret");
        assert!(config.inference.has_api_key());
    }

    #[test]
    fn test_bad_port_override_is_ignored() {
        let mut config = ServerConfig::default();
        config.apply_overrides(|k| (k == "RXPRO_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();

        config.inference.endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.inference.endpoint = default_endpoint();
        config.auth.token_lifetime_secs = 0;
        assert!(config.validate().is_err());

        config.auth.token_lifetime_secs = 60;
        config.store.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = ServerConfig::default();

        config.auth.token_lifetime_secs = MAX_TOKEN_LIFETIME_SECS;
        assert!(config.validate().is_ok());

        config.auth.token_lifetime_secs = MAX_TOKEN_LIFETIME_SECS + 1;
        assert!(config.validate().is_err());

        config.auth.token_lifetime_secs = i64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_section() {
        let config: ServerConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/rxpro-test.db"
            max_connections = 8
            acquire_timeout_secs = 3
            "#,
        )
        .unwrap();

        let db = config.database.db_config();
        assert_eq!(db.path, PathBuf::from("/tmp/rxpro-test.db"));
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.min_connections, 1);
        assert_eq!(db.acquire_timeout, Duration::from_secs(3));
        assert!(config.validate().is_ok());

        let mut config = config;
        config.database.min_connections = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("rxpro-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 9200\n\n[inference]\napi_key = \"from-file\"\n").unwrap();

        let loaded = ServerConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        // RXPRO_PORT, when set, wins over the file.
        if std::env::var("RXPRO_PORT").is_err() {
            assert_eq!(loaded.server.port, 9200);
        }
        assert!(loaded.inference.has_api_key());
    }
}
