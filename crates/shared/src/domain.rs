use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }
}

/// Users keyed by id, iterated in id order.
pub type UserMap = BTreeMap<UserId, User>;

pub fn user_map(users: impl IntoIterator<Item = User>) -> UserMap {
    users.into_iter().map(|user| (user.id, user)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogName {
    DeleteConfirm,
    DeleteReconfirm,
}

impl DialogName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeleteConfirm => "DeleteConfirm",
            Self::DeleteReconfirm => "DeleteReconfirm",
        }
    }
}

impl fmt::Display for DialogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogAction {
    Accept,
    Close,
}

/// An operator response, tied to the dialog that was showing when it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub dialog: DialogName,
    pub action: DialogAction,
}

impl Resolution {
    pub fn new(dialog: DialogName, action: DialogAction) -> Self {
        Self { dialog, action }
    }
}
