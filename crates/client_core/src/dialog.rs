//! Correlates dialog resolutions with the flow step waiting on them.

use std::sync::Arc;

use shared::domain::{DialogAction, DialogName, Resolution};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered,
    NoWaiter,
    Mismatch { awaiting: DialogName },
}

struct PendingDialog {
    dialog: DialogName,
    tx: oneshot::Sender<DialogAction>,
}

/// Single-slot mailbox: at most one flow step waits on a dialog at a time.
#[derive(Clone, Default)]
pub struct DialogRouter {
    slot: Arc<Mutex<Option<PendingDialog>>>,
}

pub struct DialogWait {
    dialog: DialogName,
    rx: oneshot::Receiver<DialogAction>,
}

impl DialogWait {
    pub fn dialog(&self) -> DialogName {
        self.dialog
    }

    /// Resolves with the operator's action, or `None` if the slot was abandoned.
    pub async fn recv(self) -> Option<DialogAction> {
        self.rx.await.ok()
    }
}

impl DialogRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, dialog: DialogName) -> DialogWait {
        let (tx, rx) = oneshot::channel();
        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.replace(PendingDialog { dialog, tx }) {
            if !previous.tx.is_closed() {
                warn!(
                    previous = previous.dialog.as_str(),
                    dialog = dialog.as_str(),
                    "replacing a dialog wait that was still pending"
                );
            }
        }
        DialogWait { dialog, rx }
    }

    pub async fn route(&self, resolution: Resolution) -> RouteOutcome {
        let mut slot = self.slot.lock().await;
        let Some(pending) = slot.take() else {
            return RouteOutcome::NoWaiter;
        };

        if pending.tx.is_closed() {
            return RouteOutcome::NoWaiter;
        }

        if pending.dialog != resolution.dialog {
            let awaiting = pending.dialog;
            *slot = Some(pending);
            warn!(
                awaiting = awaiting.as_str(),
                resolved = resolution.dialog.as_str(),
                "ignoring resolution for a dialog nobody is waiting on"
            );
            return RouteOutcome::Mismatch { awaiting };
        }

        match pending.tx.send(resolution.action) {
            Ok(()) => {
                debug!(
                    dialog = resolution.dialog.as_str(),
                    action = ?resolution.action,
                    "dialog resolved"
                );
                RouteOutcome::Delivered
            }
            Err(_) => RouteOutcome::NoWaiter,
        }
    }

    pub async fn awaiting(&self) -> Option<DialogName> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|pending| !pending.tx.is_closed())
            .map(|pending| pending.dialog)
    }
}

#[cfg(test)]
#[path = "tests/dialog_tests.rs"]
mod tests;
