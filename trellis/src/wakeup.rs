//! Scheduler-to-runtime signalling.
//!
//! The scheduler pings the runtime when a tick goes from empty to non-empty.
//! The runtime sleeps on the receiving end between ticks and, once woken,
//! flushes every queued root in one pass.

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Scheduler end of the channel.
#[derive(Clone, Debug)]
pub struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Queue a flush request without waiting.
    ///
    /// A full buffer means a flush is already queued; a closed one means the
    /// runtime has stopped. Neither needs reporting.
    pub fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Runtime end of the channel.
#[derive(Debug)]
pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    /// Sleep until the scheduler asks for a flush. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Discard requests that piled up while a flush was running, returning
    /// how many were discarded.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

/// Open a channel buffering at most `capacity` flush requests.
pub fn channel(capacity: usize) -> (WakeupSender, WakeupReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (WakeupSender { tx }, WakeupReceiver { rx })
}

/// Slot the scheduler keeps for the sender of whichever runtime drives it.
///
/// Empty until a `Runtime` is created; a scheduler flushed by hand never
/// signals anyone.
#[derive(Debug, Default, Clone)]
pub struct WakeupHandle {
    slot: Arc<Mutex<Option<WakeupSender>>>,
}

impl WakeupHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the slot at `sender`, replacing any previous runtime.
    pub fn install(&self, sender: WakeupSender) {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(sender);
    }

    pub fn is_installed(&self) -> bool {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).is_some()
    }

    /// Ping the installed runtime, if any.
    pub fn send(&self) {
        if let Some(sender) = self.slot.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            sender.send();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_runtime_is_dropped() {
        let handle = WakeupHandle::new();
        assert!(!handle.is_installed());
        handle.send();
    }

    #[test]
    fn test_full_buffer_collapses_requests() {
        let handle = WakeupHandle::new();
        let (tx, mut rx) = channel(2);
        handle.install(tx);
        assert!(handle.is_installed());

        for _ in 0..5 {
            handle.send();
        }

        assert_eq!(rx.drain(), 2);
        assert_eq!(rx.drain(), 0);
    }
}
