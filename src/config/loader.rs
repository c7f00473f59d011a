//! Configuration loading from an optional file and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{BridgeConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_PROJECT_ID: &str = "PROJECT_ID";
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_TOPIC: &str = "TOPIC";

const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
const ENV_EMULATOR_HOST: &str = "PUBSUB_EMULATOR_HOST";
const ENV_PUBLISH_TIMEOUT: &str = "PUBLISH_TIMEOUT_SECS";
const ENV_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const ENV_SAMPLE_FRACTION: &str = "TRACE_SAMPLE_FRACTION";
const ENV_MAX_PER_SECOND: &str = "TRACE_MAX_PER_SECOND";
const ENV_MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";
const ENV_SHUTDOWN_TIMEOUT: &str = "SHUTDOWN_TIMEOUT_SECS";
const ENV_METRICS_ADDRESS: &str = "METRICS_ADDRESS";
const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// Whether loading failed because a required value was absent.
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Validation(errors)
            if errors.iter().any(|e| matches!(e, ValidationError::Missing(_))))
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from `path` (if any) overlaid with process environment.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Load configuration using `lookup` in place of the process environment.
///
/// Environment values win over file values. Empty variables are ignored so
/// that `TOPIC=` cannot blank out a topic given in the file.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<BridgeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => BridgeConfig::default(),
    };

    let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = env(ENV_PROJECT_ID) {
        config.pubsub.project_id = v;
    }
    if let Some(v) = env(ENV_CREDENTIALS) {
        config.pubsub.credentials = v;
    }
    if let Some(v) = env(ENV_TOPIC) {
        config.pubsub.topic = v;
    }
    if let Some(v) = env(ENV_BIND_ADDRESS) {
        config.listener.bind_address = v;
    }
    if let Some(v) = env(ENV_EMULATOR_HOST) {
        config.pubsub.emulator_host = Some(v);
    }
    if let Some(v) = env(ENV_OTLP_ENDPOINT) {
        config.tracing.otlp_endpoint = Some(v);
    }
    if let Some(v) = env(ENV_METRICS_ADDRESS) {
        config.observability.metrics_address = Some(v);
    }
    if let Some(v) = env(ENV_PUBLISH_TIMEOUT) {
        config.pubsub.publish_timeout_secs = parse(ENV_PUBLISH_TIMEOUT, v)?;
    }
    if let Some(v) = env(ENV_SAMPLE_FRACTION) {
        config.tracing.sample_fraction = parse(ENV_SAMPLE_FRACTION, v)?;
    }
    if let Some(v) = env(ENV_MAX_PER_SECOND) {
        config.tracing.max_per_second = parse(ENV_MAX_PER_SECOND, v)?;
    }
    if let Some(v) = env(ENV_MAX_BODY_BYTES) {
        config.limits.max_body_bytes = parse(ENV_MAX_BODY_BYTES, v)?;
    }
    if let Some(v) = env(ENV_SHUTDOWN_TIMEOUT) {
        config.lifecycle.shutdown_timeout_secs = parse(ENV_SHUTDOWN_TIMEOUT, v)?;
    }
    if let Some(v) = env(ENV_LOG_FORMAT) {
        config.observability.log_format = match v.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_FORMAT,
                    value: v,
                })
            }
        };
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
