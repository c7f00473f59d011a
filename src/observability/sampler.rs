//! Rate-limited probability sampler.
//!
//! Samples a fixed fraction of new traces, and never more than
//! `max_per_second` of them, using a token bucket refilled at that rate.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use opentelemetry::trace::{
    Link, SamplingDecision, SamplingResult, SpanKind, TraceContextExt, TraceId, TraceState,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::ShouldSample;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("sampling fraction {0} must be within 0.0..=1.0")]
    Fraction(f64),

    #[error("max traces per second {0} must not be negative")]
    MaxPerSecond(f64),
}

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Samples `fraction` of traces, capped at `max_per_second`.
#[derive(Debug, Clone)]
pub struct LimitedSampler {
    fraction: f64,
    max_per_second: f64,
    bucket: Arc<Mutex<TokenBucket>>,
}

impl LimitedSampler {
    pub fn new(fraction: f64, max_per_second: f64) -> Result<Self, SamplerError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(SamplerError::Fraction(fraction));
        }
        if max_per_second.is_nan() || max_per_second < 0.0 {
            return Err(SamplerError::MaxPerSecond(max_per_second));
        }

        // Bucket holds at least one token so a limit below 1/s can still fire.
        let capacity = max_per_second.max(1.0);
        Ok(Self {
            fraction,
            max_per_second,
            bucket: Arc::new(Mutex::new(TokenBucket::new(capacity))),
        })
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn max_per_second(&self) -> f64 {
        self.max_per_second
    }

    /// Decide whether the next trace is sampled.
    pub fn sample(&self) -> bool {
        if self.fraction <= 0.0 || self.max_per_second <= 0.0 {
            return false;
        }
        if fastrand::f64() >= self.fraction {
            return false;
        }

        let capacity = self.max_per_second.max(1.0);
        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
        bucket.try_acquire(capacity, self.max_per_second)
    }
}

impl ShouldSample for LimitedSampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        _trace_id: TraceId,
        _name: &str,
        _span_kind: &SpanKind,
        _attributes: &[KeyValue],
        _links: &[Link],
    ) -> SamplingResult {
        let decision = if self.sample() {
            SamplingDecision::RecordAndSample
        } else {
            SamplingDecision::Drop
        };

        let trace_state = match parent_context {
            Some(cx) => cx.span().span_context().trace_state().clone(),
            None => TraceState::default(),
        };

        SamplingResult {
            decision,
            attributes: Vec::new(),
            trace_state,
        }
    }
}
