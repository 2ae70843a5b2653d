//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub frontend_callback_url: String,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string(), e.to_string())
            })?,
            None => 5,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "TOKEN_TTL_HOURS".to_string(),
                        format!("'{}' is not a positive number of hours", raw),
                    )
                })?,
            None => 24,
        };

        // --- Load Browser-facing Settings ---
        let frontend_callback_url = lookup("FRONTEND_CALLBACK_URL")
            .unwrap_or_else(|| "http://localhost:5173/#/auth/callback".to_string());
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            jwt_secret,
            token_ttl_hours,
            frontend_callback_url,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/skillpath"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.frontend_callback_url, "http://localhost:5173/#/auth/callback");
    }

    #[test]
    fn requires_database_url_and_secret() {
        assert!(matches!(
            load(&[("JWT_SECRET", "s3cret")]),
            Err(ConfigError::MissingVar(v)) if v == "DATABASE_URL"
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "")]),
            Err(ConfigError::MissingVar(v)) if v == "JWT_SECRET"
        ));
    }

    #[test]
    fn rejects_invalid_values() {
        let base = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")];

        let mut bad_addr = base.to_vec();
        bad_addr.push(("BIND_ADDRESS", "nowhere"));
        assert!(matches!(load(&bad_addr), Err(ConfigError::InvalidValue(..))));

        let mut bad_ttl = base.to_vec();
        bad_ttl.push(("TOKEN_TTL_HOURS", "0"));
        assert!(matches!(load(&bad_ttl), Err(ConfigError::InvalidValue(..))));

        let mut bad_level = base.to_vec();
        bad_level.push(("RUST_LOG", "chatty"));
        assert!(matches!(load(&bad_level), Err(ConfigError::InvalidValue(..))));
    }
}
