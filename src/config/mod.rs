//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (--config / BRIDGE_CONFIG)
//!     → loader.rs (parse & deserialize, overlay environment)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!     → shared via Arc with the handler and supervisor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Only PROJECT_ID, GOOGLE_APPLICATION_CREDENTIALS and TOPIC are required;
//!   everything else has a default
//! - A missing required value is fatal before any listener is bound

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_with, ConfigError};
pub use schema::BridgeConfig;
pub use schema::ListenerConfig;
pub use schema::PubSubConfig;
pub use schema::TracingConfig;
