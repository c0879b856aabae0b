//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. All values are resolved once at startup into a single typed
//! struct; nothing reads the environment after boot.

use std::env;
use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Idle timeout for sessions, in seconds (default: 30 minutes)
    pub session_idle_timeout_secs: i64,

    /// Lifetime of password-reset codes, in seconds (default: 15 minutes)
    pub reset_code_ttl_secs: i64,

    /// Mark the session cookie Secure (set behind TLS)
    pub cookie_secure: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./invoices.db".to_string())
                .into(),

            session_idle_timeout_secs: env::var("SESSION_IDLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "1800".to_string()) // 30 minutes
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_IDLE_TIMEOUT_SECS".to_string()))?,

            reset_code_ttl_secs: env::var("RESET_CODE_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string()) // 15 minutes
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESET_CODE_TTL_SECS".to_string()))?,

            cookie_secure: env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        };

        if config.session_idle_timeout_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_IDLE_TIMEOUT_SECS".to_string(),
            ));
        }
        if config.reset_code_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("RESET_CODE_TTL_SECS".to_string()));
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: 3000,
            database_path: PathBuf::from("./invoices.db"),
            session_idle_timeout_secs: 1800,
            reset_code_ttl_secs: 900,
            cookie_secure: false,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
