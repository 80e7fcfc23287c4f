//! Shutdown propagation
//!
//! A `ShutdownTrigger` flips a shared flag once; every cloned `Shutdown`
//! observes it. `listen_for_signals` wires Ctrl+C and SIGTERM to a trigger.

use tokio::sync::watch;
use tracing::{info, warn};

/// Create a connected trigger / listener pair
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Requests shutdown
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request shutdown (idempotent)
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Create another listener for this trigger
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observes a shutdown request
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested
    ///
    /// Never resolves if the trigger is dropped without firing.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Spawn a task that triggers shutdown on Ctrl+C or SIGTERM
///
/// Must be called from within a tokio runtime.
pub fn listen_for_signals() -> Shutdown {
    let (trigger, shutdown) = channel();
    let terminate = terminate_signal();

    tokio::spawn(async move {
        wait_for_signal(terminate).await;
        info!("Received shutdown signal, stopping pipeline...");
        trigger.trigger();
    });

    shutdown
}

#[cfg(unix)]
type TerminateSignal = Option<tokio::signal::unix::Signal>;

#[cfg(not(unix))]
type TerminateSignal = Option<()>;

/// Install the SIGTERM handler immediately, not on first poll
#[cfg(unix)]
fn terminate_signal() -> TerminateSignal {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(sigterm) => Some(sigterm),
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            None
        }
    }
}

#[cfg(not(unix))]
fn terminate_signal() -> TerminateSignal {
    None
}

async fn wait_for_signal(terminate: TerminateSignal) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async move {
        match terminate {
            Some(mut sigterm) => {
                sigterm.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = {
        let _ = terminate;
        std::future::pending::<()>()
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
