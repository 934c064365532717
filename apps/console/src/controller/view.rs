//! Text rendering of the store state.

use std::fmt::Write as _;

use client_core::AppState;
use shared::domain::DialogName;
use tokio::{sync::watch, task::JoinHandle};

struct DialogCopy {
    title: &'static str,
    body: Option<&'static str>,
    accept: &'static str,
    close: &'static str,
}

fn dialog_copy(dialog: DialogName) -> DialogCopy {
    match dialog {
        DialogName::DeleteConfirm => DialogCopy {
            title: "Delete user",
            body: Some("Dude, are you serious?"),
            accept: "Delete",
            close: "Never mind",
        },
        DialogName::DeleteReconfirm => DialogCopy {
            title: "Are you really sure",
            body: None,
            accept: "Ok then...",
            close: "x",
        },
    }
}

pub fn render(state: &AppState) -> String {
    let list = &state.user_list;
    let mut out = String::new();

    let _ = writeln!(out, "Users:");
    if list.users.is_empty() && !list.is_loading {
        let _ = writeln!(out, "  (none)");
    }
    for user in list.users.values() {
        let _ = writeln!(out, "  [{}] Name: {}", user.id, user.name);
    }
    if list.is_loading {
        let _ = writeln!(out, "  loading...");
    }
    if list.is_deleting {
        let _ = writeln!(out, "  deleting...");
    }
    if let Some(err) = &list.error {
        let _ = writeln!(out, "Error: {err}");
    }

    if let Some(dialog) = state.dialog.open {
        let copy = dialog_copy(dialog);
        let _ = writeln!(out, "+-- {} --", copy.title);
        if let Some(body) = copy.body {
            let _ = writeln!(out, "| {body}");
        }
        let _ = writeln!(out, "| [accept] {}   [close] {}", copy.accept, copy.close);
    }

    out
}

pub fn render_json(state: &AppState) -> String {
    serde_json::to_string_pretty(state).unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
}

pub fn render_as(state: &AppState, json: bool) -> String {
    if json {
        render_json(state)
    } else {
        render(state)
    }
}

/// Prints the state every time it changes until the store goes away.
pub fn spawn_renderer(mut rx: watch::Receiver<AppState>, json: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            println!("{}", render_as(&state, json));
        }
    })
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
