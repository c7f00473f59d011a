//! Startup orchestration.
//!
//! # Responsibilities
//! - Construct the publisher from validated configuration
//! - Install signal handlers, bind the listener, start serving
//! - Wait for SIGINT/SIGTERM, then drain within the shutdown deadline
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener runs in its own task; the supervisor only waits on signals
//! - A listener that stops without being asked to is fatal

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::http::BridgeServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::Signals;
use crate::observability::metrics;
use crate::publisher::{PubSubPublisher, Publisher};

/// Run the bridge until SIGINT or SIGTERM.
pub async fn run(config: BridgeConfig) -> Result<(), BridgeError> {
    let publisher: Arc<dyn Publisher> = Arc::new(PubSubPublisher::from_config(&config.pubsub)?);

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let signals = Signals::install().map_err(BridgeError::Signals)?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(BridgeError::Listener)?;
    let local_addr = listener.local_addr().map_err(BridgeError::Listener)?;

    tracing::info!(
        address = %local_addr,
        topic = %config.pubsub.topic,
        project_id = %config.pubsub.project_id,
        "Listening for connections"
    );

    let server = BridgeServer::new(&config, publisher);
    let stop = async move {
        let signal = signals.wait().await;
        tracing::info!(signal = %signal, "Shutdown signal received, exiting...");
    };

    serve_until(server, listener, config.lifecycle.shutdown_timeout(), stop).await
}

/// Serve on `listener` until `stop` completes, then shut down gracefully.
///
/// Returns `ShutdownTimeout` if in-flight requests are still running after
/// `shutdown_timeout`, and `Listener` if the server exits on its own.
pub async fn serve_until<F>(
    server: BridgeServer,
    listener: TcpListener,
    shutdown_timeout: Duration,
    stop: F,
) -> Result<(), BridgeError>
where
    F: Future<Output = ()>,
{
    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.listener()));

    tokio::select! {
        joined = &mut server_task => {
            let err = match joined {
                Ok(Ok(())) => std::io::Error::other("listener stopped unexpectedly"),
                Ok(Err(e)) => e,
                Err(e) => std::io::Error::other(e),
            };
            tracing::error!(error = %err, "HTTP server failed");
            return Err(BridgeError::Listener(err));
        }
        _ = stop => {}
    }

    shutdown.trigger();

    match tokio::time::timeout(shutdown_timeout, &mut server_task).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(BridgeError::Listener(e)),
        Ok(Err(e)) => Err(BridgeError::Listener(std::io::Error::other(e))),
        Err(_) => {
            tracing::warn!(
                timeout = ?shutdown_timeout,
                "In-flight requests did not finish before the shutdown deadline"
            );
            server_task.abort();
            Err(BridgeError::ShutdownTimeout(shutdown_timeout))
        }
    }
}
