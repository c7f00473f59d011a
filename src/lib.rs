//! HTTP to Google Cloud Pub/Sub bridge library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod publisher;

pub use config::schema::BridgeConfig;
pub use error::{BridgeError, HandlerError};
pub use http::BridgeServer;
pub use lifecycle::Shutdown;
pub use publisher::{MessageId, PublishError, Publisher};
