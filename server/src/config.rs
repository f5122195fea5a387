//! Server configuration from environment variables.

use crate::db::PoolSettings;
use crate::store::DEFAULT_OPERATION_TIMEOUT;
use eatinn_core::Timing;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_MAX_IDLE_TIME: &str = "15m";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool: PoolSettings,
    /// Budget for a single store operation.
    pub operation_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`: Postgres connection string
    ///
    /// Optional:
    /// - `EATINN_BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `EATINN_DB_MAX_CONNECTIONS`: pool size (default: 25)
    /// - `EATINN_DB_MAX_IDLE_TIME`: idle connection lifetime, e.g. "15m" (default: "15m")
    /// - `EATINN_DB_TIMEOUT`: per-operation budget, e.g. "3s" (default: "3s")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let bind_addr = lookup("EATINN_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("EATINN_BIND_ADDR", e))?;

        let max_connections = match lookup("EATINN_DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("EATINN_DB_MAX_CONNECTIONS", "must be a positive integer"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let max_idle_time = duration_var(&lookup, "EATINN_DB_MAX_IDLE_TIME", DEFAULT_MAX_IDLE_TIME)?;
        let operation_timeout = match lookup("EATINN_DB_TIMEOUT") {
            Some(v) => parse_duration("EATINN_DB_TIMEOUT", &v)?,
            None => DEFAULT_OPERATION_TIMEOUT,
        };
        if operation_timeout.is_zero() {
            return Err(invalid("EATINN_DB_TIMEOUT", "must be greater than zero"));
        }

        Ok(Self {
            database_url,
            bind_addr,
            pool: PoolSettings {
                max_connections,
                // Zero disables idle reaping.
                idle_timeout: (!max_idle_time.is_zero()).then_some(max_idle_time),
                connection_timeout: operation_timeout,
            },
            operation_timeout,
        })
    }
}

fn invalid(name: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_duration(name: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<Timing>()
        .map(|timing| timing.as_duration())
        .map_err(|e| invalid(name, e))
}

fn duration_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<Duration, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    parse_duration(name, &value)
}
