//! Forwards console intents to the runtime and turns the result into a status line.

use client_core::{DispatchError, DispatchOutcome, UserListRuntime};
use shared::{domain::DialogAction, protocol::Intent};

pub async fn dispatch_intent(runtime: &UserListRuntime, intent: Intent, status: &mut String) {
    let intent_name = intent.name();
    match runtime.handle_intent(intent).await {
        Ok(outcome) => {
            tracing::debug!(intent = intent_name, ?outcome, "intent handled");
            *status = describe_outcome(outcome);
        }
        Err(err) => {
            tracing::debug!(intent = intent_name, error = %err, "intent rejected");
            *status = describe_error(&err);
        }
    }
}

fn describe_outcome(outcome: DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::FetchStarted => "Loading users...".to_string(),
        DispatchOutcome::DeleteFlowStarted { user_id } => {
            format!("Deleting user {user_id} needs confirmation")
        }
        DispatchOutcome::Resolved(resolution) => match resolution.action {
            DialogAction::Accept => format!("Accepted {}", resolution.dialog),
            DialogAction::Close => format!("Closed {}", resolution.dialog),
        },
        DispatchOutcome::DialogDismissed { dialog } => format!("Dismissed {dialog}"),
    }
}

fn describe_error(err: &DispatchError) -> String {
    match err {
        DispatchError::DeleteInFlight { active, .. } => {
            format!("Finish the pending delete of user {active} first")
        }
        DispatchError::NoOpenDialog => "There is no dialog to answer".to_string(),
        DispatchError::NoStepAwaiting { dialog } => {
            format!("Still working on {dialog}, answer ignored")
        }
        DispatchError::DialogMismatch { .. } => {
            format!("Dialog answer ignored: {err}")
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
