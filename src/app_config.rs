//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with CARDEX_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like the database password belong in environment variables, not
//! in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration
///
/// The DATABASE_URL environment variable takes precedence over this file
/// setting; the file value is a fallback for local development.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Moderation engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Upper bound on row lock waits for moderation transactions, in
    /// milliseconds. Exceeding it fails the request as a retryable conflict.
    pub lock_timeout_ms: u32,
    /// Maximum rows returned by a single audit log query.
    pub audit_query_limit: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2000,
            audit_query_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub moderation: ModerationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file(Path::new("config.toml"))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CARDEX").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
