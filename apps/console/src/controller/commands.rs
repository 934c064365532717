//! Operator commands typed at the console prompt.

use std::str::FromStr;

use shared::{
    domain::{DialogAction, UserId},
    protocol::Intent,
};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  list          reload the user list
  delete <id>   start deleting a user
  accept        accept the open dialog
  close         close the open dialog
  state         print the current state
  help          show this help
  quit          exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Delete(UserId),
    Accept,
    Close,
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}'; type 'help' for the list")]
    Unknown(String),
    #[error("'delete' needs a numeric user id")]
    MissingUserId,
    #[error("'{0}' is not a valid user id")]
    InvalidUserId(String),
}

impl FromStr for ConsoleCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        match verb.as_str() {
            "list" | "ls" | "refresh" => Ok(Self::List),
            "delete" | "rm" => {
                let raw = parts.next().ok_or(CommandParseError::MissingUserId)?;
                let id = raw
                    .parse::<i64>()
                    .map_err(|_| CommandParseError::InvalidUserId(raw.to_string()))?;
                Ok(Self::Delete(UserId(id)))
            }
            "accept" | "ok" | "y" => Ok(Self::Accept),
            "close" | "cancel" | "n" => Ok(Self::Close),
            "state" => Ok(Self::State),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(CommandParseError::Unknown(line.trim().to_string())),
        }
    }
}

impl ConsoleCommand {
    pub fn intent(self) -> Option<Intent> {
        match self {
            Self::List => Some(Intent::FetchUsers),
            Self::Delete(user_id) => Some(Intent::RequestDelete { user_id }),
            Self::Accept => Some(Intent::DialogResolved {
                action: DialogAction::Accept,
            }),
            Self::Close => Some(Intent::DialogResolved {
                action: DialogAction::Close,
            }),
            Self::State | Self::Help | Self::Quit => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
