use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] immcore::error::BackendError),
    #[error(transparent)]
    Definition(#[from] immcore::error::DefinitionError),
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error("no workflow definition for kind: {0}")]
    UnknownKind(String),
    #[error("no workflow instance with id: {0}")]
    NotFound(i64),
    #[error("version conflict: expected {expected}, stored {actual}")]
    VersionConflict {
        expected: i64,
        actual: i64,
    },
    #[error("action {action} failed: {message}")]
    ActionFailed {
        action: String,
        message: String,
        retryable: bool,
    },
    #[error("subject already has a live instance: {existing}")]
    Duplicate {
        existing: i64,
    },
    #[error("no pending actions for instance: {0}")]
    NoPendingActions(i64),
}

/// Why the guard refused a transition, in the order the checks run.
///
/// The variant's display form is what ends up as the note on the
/// `RejectedByGuard` history record.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Denial {
    #[error("TENANT_MISMATCH")]
    TenantMismatch,
    #[error("INVALID_TRANSITION: no transition {transition} from state {state}")]
    InvalidTransition {
        state: String,
        transition: String,
    },
    #[error("FORBIDDEN: transition {transition}")]
    Forbidden {
        transition: String,
    },
    #[error("PRECONDITION_FAILED: {}", items.join(", "))]
    PreconditionFailed {
        items: Vec<String>,
    },
}
