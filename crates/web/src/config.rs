//! Executor settings.
//!
//! [`ExecutorConfig`] can be built in code, deserialized with serde (missing
//! fields take their defaults) or read from the environment:
//!
//! | variable                     | field          | default |
//! |------------------------------|----------------|---------|
//! | `LOCAL_REQUEST_LOG_REQUESTS` | `log_requests` | `false` |
//! | `LOCAL_REQUEST_MAX_ATTEMPTS` | `max_attempts` | `10`    |
//! | `LOCAL_REQUEST_HANDLER_PATH` | `handler_path` | none    |

use serde::Deserialize;
use thiserror::Error;

pub const LOG_REQUESTS_VAR: &str = "LOCAL_REQUEST_LOG_REQUESTS";
pub const MAX_ATTEMPTS_VAR: &str = "LOCAL_REQUEST_MAX_ATTEMPTS";
pub const HANDLER_PATH_VAR: &str = "LOCAL_REQUEST_HANDLER_PATH";

pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on host calls per execution, at least 1.
    pub max_attempts: usize,
    /// Dump requests and responses at `debug` level.
    pub log_requests: bool,
    /// Mount path removed from the front of every request path.
    pub handler_path: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

impl ConfigError {
    fn invalid_number<S: ToString>(var: &'static str, value: S) -> Self {
        Self::InvalidNumber { var, value: value.to_string() }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, log_requests: false, handler_path: None }
    }
}

impl ExecutorConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(LOG_REQUESTS_VAR) {
            config.log_requests = parse_bool(&value);
        }

        if let Some(value) = lookup(MAX_ATTEMPTS_VAR) {
            config.max_attempts =
                value.trim().parse().map_err(|_parse_error| ConfigError::invalid_number(MAX_ATTEMPTS_VAR, &value))?;
        }

        config.handler_path = lookup(HANDLER_PATH_VAR).filter(|path| !path.trim().is_empty());

        Ok(config)
    }
}

/// `true`, `1`, `yes` and `on` (any case) are true; anything else is false.
fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
