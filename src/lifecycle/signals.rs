//! OS signal handling.
//!
//! SIGINT and SIGTERM both request a graceful shutdown. Handlers are
//! installed before the listener is bound so a signal arriving during startup
//! is not lost.

use std::fmt;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// The signal that ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Installed SIGINT/SIGTERM listeners.
pub struct Signals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl Signals {
    /// Register the signal handlers.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first termination signal.
    #[cfg(unix)]
    pub async fn wait(mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        }
    }

    #[cfg(not(unix))]
    pub async fn wait(self) -> TerminationSignal {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Ctrl+C handler failed; waiting indefinitely");
            std::future::pending::<()>().await;
        }
        TerminationSignal::Interrupt
    }
}
