//! Environment-driven application configuration.

use std::time::Duration;

use reqwest::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RUNNER_TIMEOUT_SECS: u64 = 10;

/// Errors raised while reading the application configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },

    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Settings the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub runner_url: Url,
    pub runner_timeout: Duration,
    pub bind_addr: String,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` or `RUNNER_URL` is missing or
    /// when a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup, used by tests.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let runner_url = lookup("RUNNER_URL").ok_or(ConfigError::Missing { name: "RUNNER_URL" })?;
        let runner_url = Url::parse(&runner_url).map_err(|err| ConfigError::Invalid {
            name: "RUNNER_URL",
            message: err.to_string(),
        })?;

        let runner_timeout = match lookup("RUNNER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "RUNNER_TIMEOUT_SECS",
                    message: format!("expected an integer number of seconds, got {raw:?}"),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_RUNNER_TIMEOUT_SECS),
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());

        Ok(Self {
            database_url,
            runner_url,
            runner_timeout,
            bind_addr,
        })
    }
}
