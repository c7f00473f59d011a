//! Message publishing subsystem.
//!
//! # Data Flow
//! ```text
//! handler (raw body bytes)
//!     → Publisher::publish(topic, bytes)
//!     → pubsub.rs (REST call to Pub/Sub or its emulator)
//!     → MessageId assigned by the broker
//! ```
//!
//! # Design Decisions
//! - The handler only sees the `Publisher` trait, so tests swap in mocks
//! - Implementations are shared behind `Arc` and must be safe for concurrent use
//! - No retries here; a failed publish is reported to the caller as-is

pub mod pubsub;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use pubsub::PubSubPublisher;

/// Identifier the broker assigns to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Errors that can occur while publishing a message.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request never reached the broker or the connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An access token could not be obtained.
    #[error("authentication error: {0}")]
    Auth(#[from] gcp_auth::Error),

    /// The broker answered with a non-success status.
    #[error("publish rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The broker's response could not be understood.
    #[error("malformed publish response: {0}")]
    Decode(String),

    /// The broker accepted the request but returned no message ID.
    #[error("publish response contained no message IDs")]
    EmptyResponse,

    /// The publish call did not complete in time.
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a payload to a topic.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `data` unchanged to `topic`, returning the broker's ID for it.
    async fn publish(&self, topic: &str, data: &[u8]) -> Result<MessageId, PublishError>;
}
