use thiserror::Error;

use crate::flow::WorkflowKind;

/// Errors raised while validating a workflow definition table.
///
/// Any of these denote a defect in the definition itself, so they are
/// fatal at registry construction rather than at transition time.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum DefinitionError {
    #[error("workflow {kind}: duplicate state {state:?}")]
    DuplicateState {
        kind: WorkflowKind,
        state: String,
    },
    #[error("workflow {kind}: duplicate transition {name:?} out of state {state:?}")]
    DuplicateTransition {
        kind: WorkflowKind,
        state: String,
        name: String,
    },
    #[error("workflow {kind}: transition {name:?} references undeclared state {state:?}")]
    UndeclaredState {
        kind: WorkflowKind,
        name: String,
        state: String,
    },
    #[error("workflow {kind}: initial state {state:?} not declared")]
    UnknownInitial {
        kind: WorkflowKind,
        state: String,
    },
    #[error("workflow {kind}: terminal state {state:?} not declared")]
    UnknownTerminal {
        kind: WorkflowKind,
        state: String,
    },
    #[error("workflow {kind}: terminal state {state:?} has outgoing transitions")]
    TerminalOutbound {
        kind: WorkflowKind,
        state: String,
    },
    #[error("workflow {kind}: state {state:?} is a dead end but not terminal")]
    DeadEnd {
        kind: WorkflowKind,
        state: String,
    },
    #[error("duplicate definition for workflow {0}")]
    DuplicateDefinition(WorkflowKind),
}
