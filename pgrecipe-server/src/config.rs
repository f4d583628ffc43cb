use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 7999;

#[derive(Debug, Clone)]
pub struct Config {
    /// Duroxide store connection string. Only the duroxide host needs it.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub duroxide_schema: String,
    pub simulated_latency: Duration,
    pub duroxide_log_format: String,
    pub duroxide_log_level: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            duroxide_schema: lookup("DUROXIDE_SCHEMA")
                .unwrap_or_else(|| "pgrecipe_duroxide".to_string()),
            simulated_latency: Duration::from_millis(
                lookup("SIMULATED_LATENCY_MS")
                    .unwrap_or_else(|| "0".to_string())
                    .parse()
                    .context("SIMULATED_LATENCY_MS must be a number of milliseconds")?,
            ),
            duroxide_log_format: lookup("DUROXIDE_LOG_FORMAT")
                .unwrap_or_else(|| "json".to_string())
                .to_lowercase(),
            duroxide_log_level: lookup("DUROXIDE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to run the duroxide host")
    }
}
