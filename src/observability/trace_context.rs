//! Trace context extraction for inbound requests.
//!
//! The root span of each request is parented on the caller's W3C trace
//! context (`traceparent`, `tracestate`) when one is present.

use axum::http::{HeaderMap, Request};
use opentelemetry::propagation::Extractor;
use opentelemetry::{global, Context};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Extractor implementation for HTTP headers.
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Extract the remote trace context from request headers.
pub fn extract_context(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

/// Root span for an inbound request, continuing the caller's trace.
pub fn request_span<B>(request: &Request<B>) -> Span {
    let span = tracing::info_span!(
        "http_request",
        otel.kind = "server",
        method = %request.method(),
        path = %request.uri().path(),
    );
    span.set_parent(extract_context(request.headers()));
    span
}
