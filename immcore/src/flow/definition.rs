use serde::Serialize;
use std::collections::HashMap;

use crate::ac::{
    permission::Permissions,
    role::Roles,
};
use crate::dispatch::ActionRef;
use super::WorkflowKind;

mod builtin;
mod impls;

/// Presentation color token attached to a state.
///
/// Strictly display data for whatever surface renders the workflow;
/// nothing in the engine's decision path reads this.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayHint {
    Neutral,
    Info,
    Progress,
    Success,
    Warning,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub hint: DisplayHint,
}

/// A fact that must hold before a transition may apply, checked after
/// authorization.  The engine never gathers these facts itself; the
/// caller supplies them with the call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// Every item of the subject's readiness checklist passes.
    SubjectReady,
    /// The caller asserts the relevant due date has passed.
    PastDue,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    /// The name callers invoke this transition by
    pub name: &'static str,
    /// The state this transition leaves from
    pub from: &'static str,
    /// The target workflow state
    pub target: &'static str,
    /// A description of the goal of this transition
    pub description: String,
    /// The roles that are permitted to use this transition
    pub roles: Roles,
    /// Holding every one of these permissions also permits use of
    /// this transition; an empty set opens no such path.
    pub permits: Permissions,
    /// Side effects dispatched when this transition applies
    pub actions: Vec<ActionRef>,
    pub precondition: Option<Precondition>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkflowDefinition {
    pub kind: WorkflowKind,
    pub states: Vec<StateInfo>,
    pub initial: &'static str,
    pub terminal: &'static [&'static str],
    pub transitions: Vec<Transition>,
}

/// Every workflow definition known to the engine, validated on the way
/// in.  Definitions are tenant-independent; tenancy lives with the
/// instances.
#[derive(Clone, Debug)]
pub struct DefinitionRegistry(HashMap<WorkflowKind, WorkflowDefinition>);
