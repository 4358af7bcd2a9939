use serde::{Deserialize, Serialize};
use crate::flow::WorkflowKind;

mod impls;
pub mod traits;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    // catch-all when infallable conversion is required
    #[default]
    Unknown,
    Notify,
    CreateTask,
    SendEmail,
    ArchiveDocument,
    UpdateLedger,
}

/// Names one side effect attached to a transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionRef {
    pub kind: ActionKind,
    pub name: &'static str,
}

/// Everything a dispatcher gets to know about the transition it is
/// running an action for.
///
/// `dedup_token` is stable across retries of the same attempt
/// (`{instance_id}/{version}/{action}`), so a dispatcher can make
/// redelivery idempotent when effects fired but the commit lost the
/// version race.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ActionContext {
    pub instance_id: i64,
    pub kind: WorkflowKind,
    pub org_id: i64,
    pub subject: String,
    pub transition: String,
    pub from_state: String,
    pub to_state: String,
    pub actor_id: i64,
    pub dedup_token: String,
}

/// What became of one dispatched action.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ActionResult {
    pub action: String,
    pub success: bool,
    /// Only meaningful on failure: whether rerunning the action could
    /// plausibly succeed.
    pub retryable: bool,
    pub message: Option<String>,
    pub payload: Option<serde_json::Value>,
}
