//! Server settings
//!
//! Everything is read from the process environment (after `.env`, if any).

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL holding the wallet tables
    pub database_url: String,

    pub database_max_connections: u32,

    pub host: String,
    pub port: u16,

    /// `production` turns off the permissive CORS layer
    pub environment: String,

    /// HMAC secret used to sign and verify customer tokens
    pub jwt_secret: String,

    /// Lifetime of an issued token, in hours
    pub token_ttl_hours: i64,

    pub log_format: LogFormat,
}

/// `LOG_FORMAT=json` selects structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_or("PORT", 3000)?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingEnv("JWT_SECRET"))?;

        let token_ttl_hours: i64 = parse_or("TOKEN_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue("TOKEN_TTL_HOURS"));
        }

        let log_format = match env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            jwt_secret,
            token_ttl_hours,
            log_format,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingEnv(&'static str),

    #[error("{0} has an unusable value")]
    InvalidValue(&'static str),
}
