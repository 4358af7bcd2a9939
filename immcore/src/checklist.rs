use serde::{Deserialize, Serialize};

mod impls;
pub mod traits;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    // catch-all when infallable conversion is required
    #[default]
    Unknown,
    Ok,
    Missing,
    Warning,
}

/// One line of a readiness checklist.
///
/// `Warning` covers both advisory findings and collaborators that
/// could not be consulted; `detail` carries whatever specifics the
/// probe can offer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ChecklistItem {
    pub key: String,
    pub label: String,
    pub status: ItemStatus,
    pub detail: Option<String>,
}

/// The outcome of evaluating a subject's checklist.
///
/// Computed fresh on every call and never persisted.  `Warning` items
/// are surfaced without holding the subject back; `Missing` (or an
/// unrecognized status) does.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReadinessResult {
    pub subject: String,
    pub items: Vec<ChecklistItem>,
    pub ready: bool,
}
