use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};

use crate::ac::role::Roles;

pub mod definition;
mod impls;
pub mod traits;

pub use definition::{
    DefinitionRegistry,
    Transition,
    WorkflowDefinition,
};

#[non_exhaustive]
#[derive(Debug, Default, Eq, Clone, Copy, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowKind {
    // catch-all when infallable conversion is required
    #[default]
    Unknown,
    BuyerSalePipeline,
    NotaryDossier,
    Avenant,
    SavTicket,
    Invoice,
    MaterialChoice,
}

/// A live walk of a workflow definition, bound to one business object.
///
/// The `subject` is an opaque `{kind}/{id}` style reference; the engine
/// records it, filters by it, and hands it to dispatched actions, but
/// never dereferences it.  Instances are append-only and are never
/// deleted.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WorkflowInstance {
    pub id: i64,
    pub kind: WorkflowKind,
    pub org_id: i64,
    pub project_id: Option<i64>,
    pub subject: String,
    pub state: String,
    /// Bumped by one on every applied transition; the optimistic
    /// concurrency token callers must echo back.
    pub version: i64,
    pub metadata: serde_json::Value,
    pub created_ts: i64,
    pub updated_ts: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WorkflowInstances(Vec<WorkflowInstance>);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, FromPrimitive, IntoPrimitive, Deserialize, Serialize)]
#[repr(i64)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionOutcome {
    Applied = 0,
    RejectedByGuard = 1,
    ActionFailed = 2,
    #[default]
    Unknown = -1,
}

/// One entry of an instance's append-only history.
///
/// For any outcome other than `Applied` the state did not move, so
/// `to_state` equals `from_state`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TransitionRecord {
    pub id: i64,
    pub instance_id: i64,
    pub transition: String,
    pub from_state: String,
    pub to_state: String,
    pub outcome: TransitionOutcome,
    pub actor_id: i64,
    /// The roles the actor held when the attempt was made; the grant
    /// may have changed since.
    pub actor_roles: Roles,
    /// The serialized action results gathered while this transition
    /// ran, in dispatch order.
    pub action_results: Option<serde_json::Value>,
    pub note: Option<String>,
    pub created_ts: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransitionRecords(Vec<TransitionRecord>);

/// Criteria for listing instances; unset fields do not constrain.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct InstanceFilter {
    pub kind: Option<WorkflowKind>,
    pub org_id: Option<i64>,
    pub project_id: Option<i64>,
    pub state: Option<String>,
    pub subject: Option<String>,
}
