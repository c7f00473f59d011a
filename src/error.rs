//! Error types for the bridge.
//!
//! Process-level failures ([`BridgeError`]) are fatal and end the process with
//! a diagnostic. Per-request failures ([`HandlerError`]) are recovered inside
//! the handler and reach the caller only as a fixed 500 message.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::ConfigError;
use crate::publisher::PublishError;

/// Response text for a body that could not be read.
pub const BODY_READ_MESSAGE: &str = "Failed to extract message from request";

/// Response text for a failed publish.
pub const PUBLISH_MESSAGE: &str = "Failed to publish message";

/// Fatal errors raised while starting, serving or stopping the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration was missing, unreadable or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The publisher or trace recorder could not be constructed.
    #[error("Failed to create {client}: {reason}")]
    ClientConstruction { client: &'static str, reason: String },

    /// Signal handlers could not be installed.
    #[error("Failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    /// The listener failed to bind or stopped without being asked to.
    #[error("Listener failed: {0}")]
    Listener(#[source] std::io::Error),

    /// In-flight requests did not drain before the deadline.
    #[error("Graceful shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),
}

impl BridgeError {
    pub fn client(client: &'static str, reason: impl ToString) -> Self {
        BridgeError::ClientConstruction {
            client,
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while handling a single request.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request body stream failed or exceeded the size limit.
    #[error("Failed to extract message from request: {0}")]
    BodyRead(#[source] axum::Error),

    /// The publisher rejected the message or did not answer in time.
    #[error("Failed to publish message: {0}")]
    Publish(#[from] PublishError),
}

impl HandlerError {
    /// Label recorded in the publish outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            HandlerError::BodyRead(_) => "body_error",
            HandlerError::Publish(_) => "publish_error",
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        // Never echo the cause; callers only learn that something failed.
        let message = match self {
            HandlerError::BodyRead(_) => BODY_READ_MESSAGE,
            HandlerError::Publish(_) => PUBLISH_MESSAGE,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
