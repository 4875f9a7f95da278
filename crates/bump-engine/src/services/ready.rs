//! Readiness gate
//!
//! The host marks the gate ready once its platform session is up; the
//! recurring loops await it before their first pass and the coordinator
//! refuses bumps until then. Backed by a `watch` channel so any number of
//! waiters are released by the single transition.

use tokio::sync::watch;

/// One-way ready signal
#[derive(Debug)]
pub struct ReadyGate {
    signal: watch::Sender<bool>,
}

impl ReadyGate {
    /// Create a gate in the not-ready state
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self { signal }
    }

    /// Release the gate. Idempotent; later calls change nothing.
    pub fn mark_ready(&self) {
        self.signal.send_replace(true);
    }

    /// Whether the gate has been released
    pub fn is_ready(&self) -> bool {
        *self.signal.borrow()
    }

    /// Wait until the gate is released. Returns immediately if it already
    /// was.
    pub async fn wait_ready(&self) {
        let mut rx = self.signal.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}
