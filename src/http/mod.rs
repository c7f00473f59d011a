//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, root span per request)
//!     → handler.rs (read body, publish, map result to status)
//!     → 200 empty / 500 fixed text
//! ```

pub mod handler;
pub mod server;

pub use handler::AppState;
pub use server::{build_router, BridgeServer, PUBLISH_PATH};
