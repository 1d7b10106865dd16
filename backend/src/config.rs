//! Runtime configuration read from the environment (and an optional `.env`).

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::domain::import_service::DEFAULT_IMPORT_CONCURRENCY;

const PREFIX: &str = "EXPENSE_TRACKER_";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
    pub import_concurrency: usize,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:expenses.db".to_string(),
                max_connections: 5,
            },
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            import_concurrency: DEFAULT_IMPORT_CONCURRENCY,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origin: "http://localhost:8080".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read `EXPENSE_TRACKER_*` variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(&format!("{PREFIX}{name}"));

        let import_concurrency = parse_or(&var, "IMPORT_CONCURRENCY", defaults.import_concurrency)?;
        if import_concurrency == 0 {
            anyhow::bail!("{PREFIX}IMPORT_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            database: DatabaseConfig {
                url: var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_or(&var, "MAX_CONNECTIONS", defaults.database.max_connections)?,
            },
            bind_addr: parse_or(&var, "BIND_ADDR", defaults.bind_addr)?,
            import_concurrency,
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            cors_origin: var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            log_filter: var("LOG").unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_or<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value '{raw}' for {PREFIX}{name}")),
        None => Ok(default),
    }
}
