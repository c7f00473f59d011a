//! The bridge handler.
//!
//! # Responsibilities
//! - Read the whole request body (bounded by `max_body_bytes`)
//! - Publish it unchanged inside a `pubsub` child span labelled with the topic
//! - Map the result to 200 (empty body) or 500 (fixed message)
//!
//! The root span is opened by the trace layer in `server.rs` and closes when
//! the response is done, on every path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use crate::config::BridgeConfig;
use crate::error::HandlerError;
use crate::observability::metrics;
use crate::publisher::{MessageId, PublishError, Publisher};

/// Immutable context shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub topic: Arc<str>,
    pub publisher: Arc<dyn Publisher>,
    pub max_body_bytes: usize,
    pub publish_timeout: Duration,
}

impl AppState {
    pub fn new(config: &BridgeConfig, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            topic: Arc::from(config.pubsub.topic.as_str()),
            publisher,
            max_body_bytes: config.limits.max_body_bytes,
            publish_timeout: config.pubsub.publish_timeout(),
        }
    }
}

/// Publish the request body to the configured topic.
pub async fn publish_handler(State(state): State<AppState>, body: Body) -> Response {
    let start = Instant::now();

    match forward(&state, body).await {
        Ok(id) => {
            tracing::info!(message_id = %id, "Published a message with a message ID: {}", id);
            metrics::record_publish("ok", start);
            StatusCode::OK.into_response()
        }
        Err(e) => {
            match &e {
                HandlerError::BodyRead(cause) => {
                    tracing::error!(error = %cause, "Failed to extract message from request")
                }
                HandlerError::Publish(cause) => {
                    tracing::error!(topic = %state.topic, error = %cause, "Failed to publish message")
                }
            }
            metrics::record_publish(e.outcome(), start);
            e.into_response()
        }
    }
}

async fn forward(state: &AppState, body: Body) -> Result<MessageId, HandlerError> {
    let data: Bytes = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(HandlerError::BodyRead)?;

    tracing::debug!(bytes = data.len(), "Request body read");

    let span = tracing::info_span!("pubsub", topic = %state.topic);

    // The span is dropped with the instrumented future, before the result is looked at.
    let result = tokio::time::timeout(
        state.publish_timeout,
        state.publisher.publish(&state.topic, &data),
    )
    .instrument(span)
    .await;

    match result {
        Ok(published) => Ok(published?),
        Err(_) => Err(PublishError::Timeout(state.publish_timeout).into()),
    }
}
