//! Client-side core for the user list screen: the store, the fetch flow, the
//! delete confirmation coordinator and the runtime that routes view intents.

pub mod dialog;
pub mod error;
pub mod flows;
pub mod runtime;
pub mod store;

pub use dialog::{DialogRouter, RouteOutcome};
pub use error::DispatchError;
pub use flows::{run_fetch_flow, DeleteFlow, FlowOutcome, FlowPhase};
pub use runtime::{DispatchOutcome, UserListRuntime};
pub use store::{transition, Action, AppState, DialogState, Store, UserListState};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
