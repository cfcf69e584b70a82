//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown
//! - Non-unix targets only see Ctrl-C

use std::io;

/// What a received signal asks the process to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Terminate,
    Reload,
}

/// Registered signal streams.
pub struct Signals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl Signals {
    #[cfg(unix)]
    pub fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> SignalEvent {
        tokio::select! {
            _ = self.terminate.recv() => {
                tracing::info!(signal = "SIGTERM", "Signal received");
                SignalEvent::Terminate
            }
            _ = self.interrupt.recv() => {
                tracing::info!(signal = "SIGINT", "Signal received");
                SignalEvent::Terminate
            }
            _ = self.hangup.recv() => {
                tracing::info!(signal = "SIGHUP", "Signal received");
                SignalEvent::Reload
            }
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> SignalEvent {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::info!(signal = "ctrl-c", "Signal received");
        SignalEvent::Terminate
    }
}

/// Resolve on the first SIGINT/SIGTERM.
///
/// Never resolves if the handlers cannot be installed.
pub async fn termination() {
    match Signals::new() {
        Ok(mut signals) => loop {
            if signals.recv().await == SignalEvent::Terminate {
                return;
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Could not install signal handlers");
            std::future::pending::<()>().await;
        }
    }
}
