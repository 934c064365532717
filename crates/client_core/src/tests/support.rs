use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{user_map, User, UserId, UserMap},
    error::ServiceError,
};
use tokio::sync::{broadcast, Mutex, Notify};
use user_service::UserService;

use crate::store::{Action, Store};

pub fn john_and_jenny() -> UserMap {
    user_map([User::new(1, "John Doe"), User::new(2, "jenny doe")])
}

pub struct TestUserService {
    users: Mutex<UserMap>,
    fail_fetch_with: Option<String>,
    fail_delete_with: Option<String>,
    delete_gate: Option<Arc<Notify>>,
    pub delete_calls: Arc<Mutex<Vec<UserId>>>,
    pub fetch_calls: Arc<Mutex<u32>>,
}

impl TestUserService {
    pub fn with_users(users: UserMap) -> Self {
        Self {
            users: Mutex::new(users),
            fail_fetch_with: None,
            fail_delete_with: None,
            delete_gate: None,
            delete_calls: Arc::new(Mutex::new(Vec::new())),
            fetch_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing_deletes(mut self, reason: impl Into<String>) -> Self {
        self.fail_delete_with = Some(reason.into());
        self
    }

    pub fn failing_fetches(mut self, reason: impl Into<String>) -> Self {
        self.fail_fetch_with = Some(reason.into());
        self
    }

    /// Deletes block until the returned handle is notified.
    pub fn gated_deletes(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.delete_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub async fn delete_call_count(&self) -> usize {
        self.delete_calls.lock().await.len()
    }
}

#[async_trait]
impl UserService for TestUserService {
    async fn fetch_all_users(&self) -> Result<UserMap, ServiceError> {
        *self.fetch_calls.lock().await += 1;
        if let Some(reason) = &self.fail_fetch_with {
            return Err(ServiceError::fetch(reason.clone()));
        }
        Ok(self.users.lock().await.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), ServiceError> {
        self.delete_calls.lock().await.push(user_id);
        if let Some(gate) = &self.delete_gate {
            gate.notified().await;
        }
        if let Some(reason) = &self.fail_delete_with {
            return Err(ServiceError::delete(user_id, reason.clone()));
        }
        self.users.lock().await.remove(&user_id);
        Ok(())
    }
}

/// Records every action dispatched to a store from the moment it is created.
pub struct ActionLog {
    rx: broadcast::Receiver<Action>,
}

impl ActionLog {
    pub fn new(store: &Store) -> Self {
        Self {
            rx: store.subscribe_actions(),
        }
    }

    pub fn drain(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }
}
