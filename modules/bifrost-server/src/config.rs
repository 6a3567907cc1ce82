use std::env;

use anyhow::{Context, Result};

/// Default cache TTL: 24 hours.
const DEFAULT_CACHE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct PlebisciteConfig {
    pub mongo_url: String,
    pub mongo_db: String,
    pub mongo_collection: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cache_ttl_ms: u64,
    pub log_level: String,
    /// Present iff the `PLEBISCITE` feature flag is set.
    pub plebiscite: Option<PlebisciteConfig>,
}

impl Config {
    /// Load configuration from environment variables. A set `PLEBISCITE`
    /// without `MONGO_URL` is a bootstrap error.
    pub fn from_env() -> Result<Self> {
        let plebiscite = if env::var("PLEBISCITE").is_ok() {
            Some(PlebisciteConfig {
                mongo_url: env::var("MONGO_URL")
                    .context("MONGO_URL is required when PLEBISCITE is enabled")?,
                mongo_db: env::var("MONGO_DB").unwrap_or_else(|_| "bifrost".to_string()),
                mongo_collection: env::var("MONGO_COLLECTION")
                    .unwrap_or_else(|_| "plebiscite".to_string()),
            })
        } else {
            None
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            cache_ttl_ms: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_MS),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            plebiscite,
        })
    }
}
