//! Shutdown coordination between the supervisor and the server task.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The supervisor owns the coordinator; the server task holds a
/// [`ShutdownListener`] and stops accepting connections once it fires.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A listener that resolves on [`trigger`](Self::trigger).
    ///
    /// Listeners must be created before triggering to observe it.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Ask every listener to stop. Returns how many were notified.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown is requested or the coordinator is dropped.
pub struct ShutdownListener {
    rx: broadcast::Receiver<()>,
}

impl ShutdownListener {
    pub async fn recv(mut self) {
        // Closed means the coordinator is gone; treat it as a stop request.
        let _ = self.rx.recv().await;
    }
}
