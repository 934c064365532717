//! Centralized state container and its pure transition function.

use std::sync::Arc;

use serde::Serialize;
use shared::{
    domain::{DialogName, Resolution, UserId, UserMap},
    error::ServiceError,
};
use tokio::sync::{broadcast, watch};
use tracing::debug;

const ACTION_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListState {
    pub users: UserMap,
    pub is_loading: bool,
    pub is_deleting: bool,
    pub error: Option<ServiceError>,
}

impl Default for UserListState {
    fn default() -> Self {
        Self {
            users: UserMap::new(),
            is_loading: true,
            is_deleting: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogState {
    pub open: Option<DialogName>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub user_list: UserListState,
    pub dialog: DialogState,
}

impl AppState {
    pub fn with_users(users: UserMap) -> Self {
        Self {
            user_list: UserListState {
                users,
                is_loading: false,
                ..UserListState::default()
            },
            dialog: DialogState::default(),
        }
    }
}

/// Everything that flows through the store: intent markers recorded by the
/// runtime plus the events emitted by the fetch and delete flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchUserList,
    DeleteUser(UserId),
    FetchStart,
    FetchSuccess(UserMap),
    FetchFailure(ServiceError),
    DeleteStart,
    DeleteSuccess,
    DeleteFailure(ServiceError),
    OpenDialog(DialogName),
    CloseDialog,
    /// Handshake only; the waiting coordinator decides what happens next.
    ResolveDialog(Resolution),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchUserList => "fetch_user_list",
            Self::DeleteUser(_) => "delete_user",
            Self::FetchStart => "fetch_start",
            Self::FetchSuccess(_) => "fetch_success",
            Self::FetchFailure(_) => "fetch_failure",
            Self::DeleteStart => "delete_start",
            Self::DeleteSuccess => "delete_success",
            Self::DeleteFailure(_) => "delete_failure",
            Self::OpenDialog(_) => "open_dialog",
            Self::CloseDialog => "close_dialog",
            Self::ResolveDialog(_) => "resolve_dialog",
        }
    }
}

pub fn transition(state: &AppState, action: &Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::FetchStart => {
            next.user_list.is_loading = true;
        }
        Action::FetchSuccess(users) => {
            next.user_list.is_loading = false;
            next.user_list.users = users.clone();
            next.user_list.error = None;
        }
        Action::FetchFailure(err) => {
            next.user_list.is_loading = false;
            next.user_list.error = Some(err.clone());
        }
        Action::DeleteStart => {
            next.user_list.is_deleting = true;
        }
        Action::DeleteSuccess => {
            next.user_list.is_deleting = false;
            next.user_list.error = None;
        }
        Action::DeleteFailure(err) => {
            next.user_list.is_deleting = false;
            next.user_list.error = Some(err.clone());
        }
        Action::OpenDialog(name) => {
            next.dialog.open = Some(*name);
        }
        Action::CloseDialog => {
            next.dialog.open = None;
        }
        Action::FetchUserList | Action::DeleteUser(_) | Action::ResolveDialog(_) => {}
    }
    next
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<AppState>,
    actions: broadcast::Sender<Action>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        let (state, _) = watch::channel(initial);
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StoreInner { state, actions }),
        }
    }

    /// Folds `action` into the state and returns the resulting snapshot.
    pub fn dispatch(&self, action: Action) -> AppState {
        debug!(action = action.name(), "dispatching action");
        let mut snapshot = None;
        let actions = &self.inner.actions;
        self.inner.state.send_if_modified(|state| {
            let next = transition(state, &action);
            let changed = next != *state;
            *state = next;
            snapshot = Some(state.clone());
            // Published under the state lock so the action log follows fold order.
            // Nobody listening is fine.
            let _ = actions.send(action);
            changed
        });
        snapshot.unwrap_or_else(|| self.snapshot())
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn open_dialog(&self) -> Option<DialogName> {
        self.inner.state.borrow().dialog.open
    }

    pub fn subscribe_actions(&self) -> broadcast::Receiver<Action> {
        self.inner.actions.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    /// Waits until the state satisfies `predicate`, returning that state.
    pub async fn wait_until<F>(&self, mut predicate: F) -> AppState
    where
        F: FnMut(&AppState) -> bool,
    {
        let mut rx = self.inner.state.subscribe();
        let state = match rx.wait_for(|state| predicate(state)).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => self.snapshot(),
        };
        state
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
