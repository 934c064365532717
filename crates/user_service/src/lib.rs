use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use shared::{
    domain::{user_map, User, UserId, UserMap},
    error::ServiceError,
};
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn fetch_all_users(&self) -> std::result::Result<UserMap, ServiceError>;
    async fn delete_user(&self, user_id: UserId) -> std::result::Result<(), ServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    None,
    Fetch,
    Delete,
}

/// Mock backend holding the user directory in memory.
pub struct InMemoryUserService {
    users: RwLock<UserMap>,
    latency: Duration,
    failure: FailureMode,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    users: Vec<User>,
}

impl InMemoryUserService {
    pub fn new(users: UserMap) -> Self {
        Self {
            users: RwLock::new(users),
            latency: Duration::ZERO,
            failure: FailureMode::None,
        }
    }

    pub fn with_default_users() -> Self {
        Self::new(default_users())
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        let users = parse_seed(&raw)
            .with_context(|| format!("invalid seed file '{}'", path.display()))?;
        Ok(Self::new(users))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn fetch_all_users(&self) -> std::result::Result<UserMap, ServiceError> {
        self.simulate_latency().await;
        if self.failure == FailureMode::Fetch {
            return Err(ServiceError::fetch("user directory unavailable"));
        }
        let users = self.users.read().await.clone();
        debug!(count = users.len(), "fetched user list");
        Ok(users)
    }

    async fn delete_user(&self, user_id: UserId) -> std::result::Result<(), ServiceError> {
        self.simulate_latency().await;
        if self.failure == FailureMode::Delete {
            return Err(ServiceError::delete(user_id, "user directory rejected the delete"));
        }
        // Unknown ids are a no-op, matching a keyed delete.
        let removed = self.users.write().await.remove(&user_id);
        debug!(user_id = user_id.0, removed = removed.is_some(), "deleted user");
        Ok(())
    }
}

pub fn default_users() -> UserMap {
    user_map([User::new(1, "John Doe"), User::new(2, "jenny doe")])
}

pub fn parse_seed(raw: &str) -> Result<UserMap> {
    let seed: SeedFile = toml::from_str(raw).context("failed to parse seed users")?;
    let count = seed.users.len();
    let users = user_map(seed.users);
    if users.len() != count {
        anyhow::bail!("seed file contains duplicate user ids");
    }
    Ok(users)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
