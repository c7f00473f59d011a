//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the bridge handler at `/pubsub`
//! - Wire up the trace layer that opens one root span per request
//! - Serve on a listener until the shutdown channel fires, then drain

use std::sync::Arc;

use axum::{body::Body, http::Request, routing::any, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::BridgeConfig;
use crate::http::handler::{publish_handler, AppState};
use crate::lifecycle::shutdown::ShutdownListener;
use crate::observability::trace_context;
use crate::publisher::Publisher;

/// Path the bridge handler is mounted on.
pub const PUBLISH_PATH: &str = "/pubsub";

/// HTTP server for the bridge.
pub struct BridgeServer {
    router: Router,
}

impl BridgeServer {
    /// Create a new HTTP server publishing through `publisher`.
    pub fn new(config: &BridgeConfig, publisher: Arc<dyn Publisher>) -> Self {
        let state = AppState::new(config, publisher);
        Self {
            router: build_router(state),
        }
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Once signalled, no new connections are accepted and the call returns
    /// after in-flight requests have completed.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, path = PUBLISH_PATH, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("HTTP server draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(PUBLISH_PATH, any(publish_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| trace_context::request_span(request)),
        )
}
