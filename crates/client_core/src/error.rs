use shared::domain::{DialogName, UserId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("delete of user {active} is still in progress; request for user {requested} rejected")]
    DeleteInFlight { active: UserId, requested: UserId },
    #[error("no dialog is open to resolve")]
    NoOpenDialog,
    #[error("{dialog} cannot be answered while the delete flow is between steps")]
    NoStepAwaiting { dialog: DialogName },
    #[error("resolution for {resolved} does not match the awaited dialog {awaiting}")]
    DialogMismatch {
        awaiting: DialogName,
        resolved: DialogName,
    },
}
