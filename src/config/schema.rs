//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Destination project, topic and credentials.
    pub pubsub: PubSubConfig,

    /// Trace sampling and export settings.
    pub tracing: TracingConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// Logging format and metrics exposition.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Pub/Sub destination configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PubSubConfig {
    /// Google Cloud project that owns the topic.
    pub project_id: String,

    /// Path to the service account credentials file.
    pub credentials: String,

    /// Topic every request body is published to.
    pub topic: String,

    /// Pub/Sub REST endpoint.
    pub endpoint: String,

    /// Emulator host ("localhost:8085"). When set, requests go to the
    /// emulator over plain HTTP without authentication.
    pub emulator_host: Option<String>,

    /// Upper bound on a single publish call in seconds.
    pub publish_timeout_secs: u64,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            credentials: String::new(),
            topic: String::new(),
            endpoint: "https://pubsub.googleapis.com".to_string(),
            emulator_host: None,
            publish_timeout_secs: 30,
        }
    }
}

impl PubSubConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}

/// Trace sampling and export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Fraction of root spans sampled (0.0 to 1.0).
    pub sample_fraction: f64,

    /// Maximum sampled traces per second.
    pub max_per_second: f64,

    /// OTLP collector endpoint. Span export is disabled when unset.
    pub otlp_endpoint: Option<String>,

    /// Service name reported with exported spans.
    pub service_name: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            sample_fraction: 0.1,
            max_per_second: 5.0,
            otlp_endpoint: None,
            service_name: "pubsub-bridge".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        // Pub/Sub rejects messages above 10 MB.
        Self {
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Time allowed for in-flight requests to drain after a signal.
    pub shutdown_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 30,
        }
    }
}

impl LifecycleConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "pubsub_bridge=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.tracing.sample_fraction, 0.1);
        assert_eq!(config.tracing.max_per_second, 5.0);
        assert_eq!(config.limits.max_body_bytes, 10 * 1024 * 1024);
        assert!(config.pubsub.emulator_host.is_none());
        assert!(config.pubsub.topic.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [pubsub]
            project_id = "p1"
            topic = "t1"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.pubsub.project_id, "p1");
        assert_eq!(config.pubsub.topic, "t1");
        assert_eq!(config.pubsub.publish_timeout_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.lifecycle.shutdown_timeout(), Duration::from_secs(30));
    }
}
