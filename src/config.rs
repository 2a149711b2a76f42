//! Configuration management for the Prediwin backend

use anyhow::Result;
use std::env;

/// Backend configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database
    pub database_path: String,

    /// Address the HTTP API binds to
    pub listen_addr: String,

    /// Price oracle endpoint for spot prices (optional; market listing
    /// omits prices when unset)
    pub oracle_url: Option<String>,

    /// Oracle request timeout in seconds
    pub oracle_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "prediwin.db".to_string());

        let listen_addr = env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string());

        let oracle_url = env::var("ORACLE_URL").ok().filter(|s| !s.is_empty());

        let oracle_timeout_seconds = env::var("ORACLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            database_path,
            listen_addr,
            oracle_url,
            oracle_timeout_seconds,
        })
    }
}
