//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::relay::MAX_ROOM_SIZE;
use crate::util::rate_limit::INPUT_RATE_LIMIT;

/// Relay configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS; empty allows any origin
    pub client_origins: Vec<String>,
    /// Peers per room
    pub max_room_size: usize,
    /// Inbound messages per second per connection
    pub input_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT; NODE_PORT and SERVER_ADDR are fallbacks
        let server_addr = match lookup("PORT").or_else(|| lookup("NODE_PORT")) {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let max_room_size = match lookup("MAX_ROOM_SIZE") {
            Some(raw) => parse_positive(&raw, "MAX_ROOM_SIZE")?,
            None => MAX_ROOM_SIZE,
        };

        let input_rate_limit = match lookup("INPUT_RATE_LIMIT") {
            Some(raw) => parse_positive(&raw, "INPUT_RATE_LIMIT")?,
            None => INPUT_RATE_LIMIT,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origins,
            max_room_size,
            input_rate_limit,
        })
    }
}

fn parse_positive<T>(raw: &str, key: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid(key)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
