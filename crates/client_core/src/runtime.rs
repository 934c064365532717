//! Routes view intents into the store, the fetch flow and the delete coordinator.

use std::sync::Arc;

use shared::{
    domain::{DialogAction, DialogName, Resolution, UserId},
    error::ServiceError,
    protocol::Intent,
};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};
use user_service::UserService;

use crate::{
    dialog::{DialogRouter, RouteOutcome},
    error::DispatchError,
    flows::{run_fetch_flow, DeleteFlow, FlowOutcome, FlowPhase},
    store::{Action, Store},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    FetchStarted,
    DeleteFlowStarted { user_id: UserId },
    Resolved(Resolution),
    /// A leftover dialog with no flow behind it was closed.
    DialogDismissed { dialog: DialogName },
}

struct ActiveFlow {
    user_id: UserId,
    phase: watch::Receiver<FlowPhase>,
    handle: JoinHandle<FlowOutcome>,
}

impl ActiveFlow {
    fn is_running(&self) -> bool {
        !self.handle.is_finished() && !self.phase.borrow().is_terminal()
    }
}

pub struct UserListRuntime {
    store: Store,
    service: Arc<dyn UserService>,
    router: DialogRouter,
    active: Mutex<Option<ActiveFlow>>,
}

impl UserListRuntime {
    pub fn new(store: Store, service: Arc<dyn UserService>) -> Self {
        Self {
            store,
            service,
            router: DialogRouter::new(),
            active: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn handle_intent(&self, intent: Intent) -> Result<DispatchOutcome, DispatchError> {
        debug!(intent = intent.name(), "handling intent");
        match intent {
            Intent::FetchUsers => {
                self.store.dispatch(Action::FetchUserList);
                let store = self.store.clone();
                let service = Arc::clone(&self.service);
                tokio::spawn(async move {
                    if let Err(err) = run_fetch_flow(&store, service.as_ref()).await {
                        warn!(error = %err, "user list fetch failed");
                    }
                });
                Ok(DispatchOutcome::FetchStarted)
            }
            Intent::RequestDelete { user_id } => self.start_delete(user_id).await,
            Intent::DialogResolved { action } => self.resolve_dialog(action).await,
        }
    }

    async fn resolve_dialog(&self, action: DialogAction) -> Result<DispatchOutcome, DispatchError> {
        let Some(dialog) = self.store.open_dialog() else {
            warn!(action = ?action, "resolution received with no dialog open");
            return Err(DispatchError::NoOpenDialog);
        };

        // Held until routing is done so no delete flow starts underneath.
        let active = self.active.lock().await;
        let flow_running = active.as_ref().is_some_and(ActiveFlow::is_running);
        match self.router.awaiting().await {
            Some(awaiting) if awaiting != dialog => {
                warn!(
                    awaiting = awaiting.as_str(),
                    resolved = dialog.as_str(),
                    "resolution does not match the awaited dialog"
                );
                return Err(DispatchError::DialogMismatch {
                    awaiting,
                    resolved: dialog,
                });
            }
            None if flow_running => {
                warn!(dialog = dialog.as_str(), "resolution arrived while no step is waiting");
                return Err(DispatchError::NoStepAwaiting { dialog });
            }
            _ => {}
        }

        let resolution = Resolution::new(dialog, action);
        self.store.dispatch(Action::ResolveDialog(resolution));
        let outcome = match self.router.route(resolution).await {
            RouteOutcome::Delivered => Ok(DispatchOutcome::Resolved(resolution)),
            RouteOutcome::NoWaiter => {
                debug!(dialog = dialog.as_str(), "dismissing dialog with no waiting flow");
                self.store.dispatch(Action::CloseDialog);
                Ok(DispatchOutcome::DialogDismissed { dialog })
            }
            RouteOutcome::Mismatch { awaiting } => Err(DispatchError::DialogMismatch {
                awaiting,
                resolved: dialog,
            }),
        };
        drop(active);
        outcome
    }

    /// Runs the fetch flow to completion on the caller's task.
    pub async fn fetch_now(&self) -> Result<usize, ServiceError> {
        self.store.dispatch(Action::FetchUserList);
        run_fetch_flow(&self.store, self.service.as_ref()).await
    }

    async fn start_delete(&self, user_id: UserId) -> Result<DispatchOutcome, DispatchError> {
        let mut active = self.active.lock().await;
        if let Some(flow) = active.as_ref() {
            if !flow.handle.is_finished() {
                warn!(
                    active = flow.user_id.0,
                    requested = user_id.0,
                    "rejecting delete while another is in progress"
                );
                return Err(DispatchError::DeleteInFlight {
                    active: flow.user_id,
                    requested: user_id,
                });
            }
        }

        self.store.dispatch(Action::DeleteUser(user_id));
        let (phase_tx, phase_rx) = watch::channel(FlowPhase::Idle);
        let flow = DeleteFlow::new(
            self.store.clone(),
            Arc::clone(&self.service),
            self.router.clone(),
            phase_tx,
        );
        let handle = tokio::spawn(flow.run(user_id));
        *active = Some(ActiveFlow {
            user_id,
            phase: phase_rx,
            handle,
        });

        Ok(DispatchOutcome::DeleteFlowStarted { user_id })
    }

    pub async fn active_phase(&self) -> Option<FlowPhase> {
        let active = self.active.lock().await;
        active.as_ref().map(|flow| *flow.phase.borrow())
    }

    pub async fn is_delete_in_flight(&self) -> bool {
        let active = self.active.lock().await;
        active
            .as_ref()
            .is_some_and(|flow| !flow.handle.is_finished())
    }

    /// Waits for the in-flight delete flow, if any, and returns how it ended.
    pub async fn join_active_flow(&self) -> Option<FlowOutcome> {
        let mut phase = {
            let active = self.active.lock().await;
            active.as_ref()?.phase.clone()
        };
        // The slot stays occupied until the flow is terminal.
        let _ = phase.wait_for(|phase| phase.is_terminal()).await;

        let flow = self.active.lock().await.take()?;
        match flow.handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(user_id = flow.user_id.0, error = %err, "delete flow did not complete");
                None
            }
        }
    }

    /// Aborts the in-flight delete flow. Its dialog is closed on the way out.
    pub async fn shutdown(&self) {
        let Some(flow) = self.active.lock().await.take() else {
            return;
        };
        flow.handle.abort();
        if let Err(err) = flow.handle.await {
            if !err.is_cancelled() {
                warn!(user_id = flow.user_id.0, error = %err, "delete flow failed during shutdown");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
