//! Configuration validation.
//!
//! Returns every problem found rather than stopping at the first one, so an
//! operator fixing a deployment sees the whole list.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::loader::{ENV_CREDENTIALS, ENV_PROJECT_ID, ENV_TOPIC};
use crate::config::schema::BridgeConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required value is absent or empty.
    #[error("{0} must be set and non-empty")]
    Missing(&'static str),

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("sample fraction {0} is outside 0.0..=1.0")]
    SampleFraction(f64),

    #[error("max traces per second {0} must not be negative")]
    MaxPerSecond(f64),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        (ENV_PROJECT_ID, &config.pubsub.project_id),
        (ENV_CREDENTIALS, &config.pubsub.credentials),
        (ENV_TOPIC, &config.pubsub.topic),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Missing(name));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::MetricsAddress(addr.clone()));
        }
    }

    let fraction = config.tracing.sample_fraction;
    if !(0.0..=1.0).contains(&fraction) {
        errors.push(ValidationError::SampleFraction(fraction));
    }
    if config.tracing.max_per_second < 0.0 || config.tracing.max_per_second.is_nan() {
        errors.push(ValidationError::MaxPerSecond(config.tracing.max_per_second));
    }

    if config.pubsub.publish_timeout_secs == 0 {
        errors.push(ValidationError::Zero("publish_timeout_secs"));
    }
    if config.lifecycle.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::Zero("shutdown_timeout_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("max_body_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
