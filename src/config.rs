use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_HTTP_ADDR: &str = "BUSINESS_DAYS_HTTP_ADDR";
pub const ENV_DB_PATH: &str = "BUSINESS_DAYS_DB";
pub const ENV_LOG_LEVEL: &str = "BUSINESS_DAYS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BUSINESS_DAYS_LOG_DIR";
pub const ENV_MINIMUM: &str = "BUSINESS_DAYS_MINIMUM";

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid socket address: {value}")]
    InvalidAddr { key: &'static str, value: String },
    #[error("{key} must be an integer: {value}")]
    InvalidInteger { key: &'static str, value: String },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

/// Runtime settings shared by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    /// SQLite file; `None` keeps records in memory for the lifetime of the process.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub minimum_business_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            minimum_business_days: 0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank optional keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let http_addr_raw = get(ENV_HTTP_ADDR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = http_addr_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr {
                key: ENV_HTTP_ADDR,
                value: http_addr_raw.clone(),
            })?;

        let minimum_business_days = match get(ENV_MINIMUM) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidInteger {
                    key: ENV_MINIMUM,
                    value: raw.clone(),
                })?,
            None => 0,
        };

        let log_level = match lookup(ENV_LOG_LEVEL) {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Empty { key: ENV_LOG_LEVEL });
            }
            Some(raw) => raw.trim().to_ascii_lowercase(),
            None => DEFAULT_LOG_LEVEL.to_string(),
        };

        Ok(Self {
            http_addr,
            db_path: get(ENV_DB_PATH).map(PathBuf::from),
            log_level,
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
            minimum_business_days,
        })
    }
}
