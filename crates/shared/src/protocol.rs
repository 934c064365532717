use serde::{Deserialize, Serialize};

use crate::domain::{DialogAction, UserId};

/// Requests raised by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    FetchUsers,
    RequestDelete { user_id: UserId },
    DialogResolved { action: DialogAction },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchUsers => "fetch_users",
            Self::RequestDelete { .. } => "request_delete",
            Self::DialogResolved { .. } => "dialog_resolved",
        }
    }
}
