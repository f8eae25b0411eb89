//! Configuration module for the character-builder backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret for signing and verifying bearer tokens.
    /// Falls back to a hardcoded default when unset.
    pub secret_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let secret_key = env::var("DND_SECRET_KEY").ok();

        let db_path = env::var("DND_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let index_path = env::var("DND_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = env::var("DND_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:4000".to_string())
            .parse()
            .expect("Invalid DND_BIND_ADDR format");

        let log_level = env::var("DND_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            secret_key,
            db_path,
            index_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("DND_SECRET_KEY");
        env::remove_var("DND_DB_PATH");
        env::remove_var("DND_INDEX_PATH");
        env::remove_var("DND_BIND_ADDR");
        env::remove_var("DND_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.secret_key.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/index"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:4000");
        assert_eq!(config.log_level, "info");
    }
}
