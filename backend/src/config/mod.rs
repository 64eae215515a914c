//! Configuration module for the riders club backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON data files
    pub data_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Username of the admin created when no users exist yet
    pub admin_username: Option<String>,
    /// Password of the admin created when no users exist yet
    pub admin_password: Option<String>,
    /// Mark session cookies `Secure` (set when served over HTTPS)
    pub secure_cookies: bool,
}

/// Raised when an environment variable holds an unusable value.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("RIDERS_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let bind_addr = env::var("RIDERS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| ConfigError(format!("invalid RIDERS_BIND_ADDR {bind_addr:?}: {e}")))?;

        let log_level = env::var("RIDERS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin_username = non_empty_var("RIDERS_ADMIN_USERNAME");
        let admin_password = non_empty_var("RIDERS_ADMIN_PASSWORD");

        let secure_cookies = env::var("RIDERS_SECURE_COOKIES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            bind_addr,
            log_level,
            admin_username,
            admin_password,
            secure_cookies,
        })
    }

    /// Bootstrap admin credentials, when both halves are configured.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
