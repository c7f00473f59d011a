//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and supervisor produce:
//!     → tracing events (structured log lines)
//!     → tracing spans (http_request root, pubsub child)
//!     → metrics.rs (publish counters, latency histogram)
//!
//! Consumers:
//!     → stdout (plain or JSON)
//!     → OTLP collector, sampled by sampler.rs (optional)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Root spans continue the caller's W3C trace context
//! - Span export is sampled; logs are not
//! - Export and metrics are off unless an address is configured

pub mod metrics;
pub mod sampler;
pub mod telemetry;
pub mod trace_context;

pub use sampler::LimitedSampler;
pub use telemetry::{init_telemetry, TelemetryGuard};
