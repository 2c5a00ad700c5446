//! Server bootstrap concerns: configuration loading.

pub mod config;

pub use config::{AppConfig, ConfigError};
