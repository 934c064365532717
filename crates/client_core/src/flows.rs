//! Fetch flow and the two-step delete confirmation coordinator.

use std::sync::Arc;

use shared::{
    domain::{DialogAction, DialogName, UserId},
    error::ServiceError,
};
use tokio::sync::watch;
use tracing::{info, warn};
use user_service::UserService;

use crate::{
    dialog::DialogRouter,
    store::{Action, Store},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    AwaitingFirstConfirm,
    AwaitingSecondConfirm,
    Deleting,
    Done,
    Closed,
}

impl FlowPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Deleted { user_id: UserId },
    Closed { user_id: UserId, stage: DialogName },
    Failed { user_id: UserId, error: ServiceError },
}

/// Loads the user list into the store. Returns the number of users fetched.
pub async fn run_fetch_flow(
    store: &Store,
    service: &dyn UserService,
) -> Result<usize, ServiceError> {
    store.dispatch(Action::FetchStart);
    match service.fetch_all_users().await {
        Ok(users) => {
            let count = users.len();
            store.dispatch(Action::FetchSuccess(users));
            Ok(count)
        }
        Err(err) => {
            store.dispatch(Action::FetchFailure(err.clone()));
            Err(err)
        }
    }
}

/// Closes whatever the coordinator left open if it is dropped mid-flow.
struct FlowCleanup {
    store: Store,
    dialog_open: bool,
    pending_delete: Option<UserId>,
}

impl FlowCleanup {
    fn new(store: Store) -> Self {
        Self {
            store,
            dialog_open: false,
            pending_delete: None,
        }
    }

    fn close_dialog(&mut self) {
        self.dialog_open = false;
        self.store.dispatch(Action::CloseDialog);
    }
}

impl Drop for FlowCleanup {
    fn drop(&mut self) {
        if let Some(user_id) = self.pending_delete.take() {
            warn!(user_id = user_id.0, "delete flow dropped while the delete call was in flight");
            self.store.dispatch(Action::DeleteFailure(ServiceError::delete(
                user_id,
                "delete flow cancelled",
            )));
        }
        if self.dialog_open {
            warn!("delete flow dropped with a dialog open; closing it");
            self.store.dispatch(Action::CloseDialog);
        }
    }
}

pub struct DeleteFlow {
    store: Store,
    service: Arc<dyn UserService>,
    router: DialogRouter,
    phase: watch::Sender<FlowPhase>,
}

impl DeleteFlow {
    pub fn new(
        store: Store,
        service: Arc<dyn UserService>,
        router: DialogRouter,
        phase: watch::Sender<FlowPhase>,
    ) -> Self {
        Self {
            store,
            service,
            router,
            phase,
        }
    }

    pub async fn run(self, user_id: UserId) -> FlowOutcome {
        let mut cleanup = FlowCleanup::new(self.store.clone());

        self.enter(FlowPhase::AwaitingFirstConfirm);
        if self.confirm(DialogName::DeleteConfirm, &mut cleanup).await == DialogAction::Close {
            return self.close(user_id, DialogName::DeleteConfirm, &mut cleanup);
        }

        self.enter(FlowPhase::AwaitingSecondConfirm);
        if self.confirm(DialogName::DeleteReconfirm, &mut cleanup).await == DialogAction::Close {
            return self.close(user_id, DialogName::DeleteReconfirm, &mut cleanup);
        }

        self.enter(FlowPhase::Deleting);
        self.store.dispatch(Action::DeleteStart);
        cleanup.pending_delete = Some(user_id);
        let result = self.service.delete_user(user_id).await;
        cleanup.pending_delete = None;

        match result {
            Ok(()) => {
                self.store.dispatch(Action::DeleteSuccess);
                if let Err(err) = run_fetch_flow(&self.store, self.service.as_ref()).await {
                    warn!(user_id = user_id.0, error = %err, "refresh after delete failed");
                }
                cleanup.close_dialog();
                self.enter(FlowPhase::Done);
                info!(user_id = user_id.0, "user deleted");
                FlowOutcome::Deleted { user_id }
            }
            Err(err) => {
                self.store.dispatch(Action::DeleteFailure(err.clone()));
                // A failed delete leaves the dialog open.
                cleanup.dialog_open = false;
                self.enter(FlowPhase::Done);
                warn!(user_id = user_id.0, error = %err, "user delete failed");
                FlowOutcome::Failed {
                    user_id,
                    error: err,
                }
            }
        }
    }

    async fn confirm(&self, dialog: DialogName, cleanup: &mut FlowCleanup) -> DialogAction {
        let wait = self.router.register(dialog).await;
        self.store.dispatch(Action::OpenDialog(dialog));
        cleanup.dialog_open = true;

        match wait.recv().await {
            Some(action) => action,
            None => {
                warn!(dialog = dialog.as_str(), "dialog wait abandoned; treating as close");
                DialogAction::Close
            }
        }
    }

    fn close(&self, user_id: UserId, stage: DialogName, cleanup: &mut FlowCleanup) -> FlowOutcome {
        cleanup.close_dialog();
        self.enter(FlowPhase::Closed);
        info!(user_id = user_id.0, stage = stage.as_str(), "delete cancelled by operator");
        FlowOutcome::Closed { user_id, stage }
    }

    fn enter(&self, phase: FlowPhase) {
        self.phase.send_replace(phase);
    }
}

#[cfg(test)]
#[path = "tests/flows_tests.rs"]
mod tests;
