use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// Ctrl-C state shared between the signal listener and the script loop.
///
/// An interrupt cancels the current token. The loop either consumes it
/// (after a script was killed) or treats it as a request to stop.
#[derive(Debug, Default)]
pub struct Interrupts {
    token: Mutex<CancellationToken>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the next blocking wait.
    pub fn token(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn trigger(&self) {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_cancelled()
    }

    /// Clear a pending interrupt. Returns whether one was pending.
    pub fn consume(&self) -> bool {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            *token = CancellationToken::new();
            true
        } else {
            false
        }
    }

    /// Forward every Ctrl-C to [`Interrupts::trigger`] for the rest of the
    /// process lifetime.
    pub fn listen_for_ctrl_c(self: &Arc<Self>) {
        let interrupts = Arc::clone(self);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                interrupts.trigger();
            }
        });
    }
}
