//! Server configuration.
//!
//! Defaults suit local development. `ServerConfig::from_env` overlays the
//! process environment on top of them.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the environment in which internal error details are exposed.
pub const DEVELOPMENT: &str = "development";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name (default: "development")
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Start with the welcome todos (default: true)
    #[serde(default = "default_seed")]
    pub seed: bool,

    /// CORS allowed origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    DEVELOPMENT.to_string()
}

fn default_seed() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            seed: default_seed(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `APP_ENV`, `SEED_TODOS` and `CORS_ORIGINS`
    /// (comma-separated) from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with variables resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(environment) = lookup("APP_ENV") {
            config.environment = environment;
        }
        if let Some(seed) = lookup("SEED_TODOS") {
            config.seed = parse_flag(&seed).ok_or(ConfigError::Invalid {
                key: "SEED_TODOS",
                value: seed.clone(),
            })?;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(|origin| parse_origin(origin).map(|_| origin.to_string()))
                .collect::<Result<_, _>>()?;
        }

        Ok(config)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }
}

/// Check that `origin` is an http(s) origin usable as a CORS header value.
pub fn parse_origin(origin: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "CORS_ORIGINS",
        value: origin.to_string(),
    };
    let host = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .ok_or_else(invalid)?;
    if host.is_empty() || host.contains(['/', ' ']) {
        return Err(invalid());
    }
    HeaderValue::from_str(origin).map_err(|_| invalid())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
