//! Logging and trace export initialization.
//!
//! Logs always go to stdout through `tracing-subscriber`, as plain text or
//! JSON. When an OTLP endpoint is configured, spans are also exported through
//! OpenTelemetry, sampled by a parent-based [`LimitedSampler`].

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::config::TracingConfig;
use crate::error::BridgeError;
use crate::observability::sampler::LimitedSampler;

/// Keeps the trace exporter alive; flushes pending spans on shutdown.
pub struct TelemetryGuard {
    tracer_provider: Option<TracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    pub fn exporting(&self) -> bool {
        self.tracer_provider.is_some()
    }

    /// Flush and stop the trace exporter.
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("Error shutting down tracer provider: {:?}", e);
            }
        }
    }
}

/// Build the trace recorder: a tracer provider exporting to `endpoint`.
fn build_tracer_provider(
    config: &TracingConfig,
    endpoint: &str,
) -> Result<TracerProvider, BridgeError> {
    let sampler = LimitedSampler::new(config.sample_fraction, config.max_per_second)
        .map_err(|e| BridgeError::client("trace sampling policy", e))?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| BridgeError::client("trace client", e))?;

    let resource = Resource::new(vec![KeyValue::new(
        opentelemetry_semantic_conventions::resource::SERVICE_NAME,
        config.service_name.clone(),
    )]);

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(Sampler::ParentBased(Box::new(sampler)))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build())
}

/// Install the global subscriber.
///
/// Must run inside a Tokio runtime when span export is enabled.
pub fn init_telemetry(
    tracing_config: &TracingConfig,
    observability: &ObservabilityConfig,
) -> Result<TelemetryGuard, BridgeError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer_provider = match &tracing_config.otlp_endpoint {
        Some(endpoint) => Some(build_tracer_provider(tracing_config, endpoint)?),
        None => None,
    };

    let otel_layer = tracer_provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer("pubsub-bridge"))
    });

    let fmt_layer = match observability.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| BridgeError::client("log subscriber", e))?;

    tracing::info!(
        exporting = tracer_provider.is_some(),
        sample_fraction = tracing_config.sample_fraction,
        max_per_second = tracing_config.max_per_second,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { tracer_provider })
}
