use thiserror::Error;

use crate::task::TaskStatus;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced synchronously to callers. Execution failures are not
/// here: they become a terminal `failed` record and reach callers only
/// through status polls.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Malformed or incomplete submission; nothing was created.
    #[error("validation failed: {field} {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// Lookup key that is not even shaped like a task id.
    #[error("invalid task identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Well-formed id that no record answers to.
    #[error("task not found: {0}")]
    NotFound(String),

    /// Illegal state-machine move. Indicates a bug in the executor, not a
    /// recoverable runtime condition.
    #[error("illegal transition {from} -> {to} for task {id}")]
    Conflict {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}
