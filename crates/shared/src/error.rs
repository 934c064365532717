use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fetch,
    Delete,
}

/// Failure reported by the user data service. Kept in state for the view to show.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceError {
    #[error("failed to fetch user list: {reason}")]
    Fetch { reason: String },
    #[error("failed to delete user {user_id}: {reason}")]
    Delete { user_id: UserId, reason: String },
}

impl ServiceError {
    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::Fetch {
            reason: reason.into(),
        }
    }

    pub fn delete(user_id: UserId, reason: impl Into<String>) -> Self {
        Self::Delete {
            user_id,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Delete { .. } => ErrorKind::Delete,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Fetch { reason } | Self::Delete { reason, .. } => reason,
        }
    }
}
