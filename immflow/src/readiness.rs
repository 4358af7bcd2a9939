use async_trait::async_trait;
use immcore::{
    checklist::{
        ChecklistItem,
        ItemStatus,
        ReadinessResult,
        traits::{
            DocumentStore,
            InvoiceStore,
        },
    },
    error::BackendError,
    flow::{
        InstanceFilter,
        WorkflowKind,
    },
};
use std::sync::Arc;

use crate::platform::Platform;

/// Document kinds a dossier must carry before submission.
pub const REQUIRED_DOCUMENT_KINDS: &[&str] = &[
    "ID_DOC",
    "ATTESTATION_FINANCEMENT",
];

// material choice states that count as settled by the buyer
const CONFIRMED_OR_LATER: &[&str] = &[
    "confirmed",
    "approved",
    "ordered",
    "installed",
];

/// One line of the readiness checklist, answered against live data.
#[async_trait]
pub trait ChecklistProbe: Send + Sync {
    fn key(&self) -> &'static str;
    fn label(&self) -> &'static str;
    async fn check(
        &self,
        org_id: i64,
        subject: &str,
    ) -> Result<ChecklistItem, BackendError>;
}

/// Run the probes in order and fold the answers into one result.
///
/// This never fails: a probe that cannot reach its collaborator is
/// reported as a `Warning` item carrying the error text, so one dead
/// integration never hides the rest of the checklist.
pub async fn compute(
    subject: &str,
    org_id: i64,
    probes: &[Box<dyn ChecklistProbe>],
) -> ReadinessResult {
    let mut items = Vec::with_capacity(probes.len());
    for probe in probes.iter() {
        items.push(match probe.check(org_id, subject).await {
            Ok(item) => item,
            Err(e) => ChecklistItem::new(
                probe.key(),
                probe.label(),
                ItemStatus::Warning,
                Some(e.to_string()),
            ),
        });
    }
    ReadinessResult::new(subject, items)
}

/// The identity and financing documents must be on file.
pub struct RequiredDocumentsProbe {
    store: Arc<dyn DocumentStore>,
}

impl RequiredDocumentsProbe {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChecklistProbe for RequiredDocumentsProbe {
    fn key(&self) -> &'static str {
        "DOCS_REQUIRED"
    }

    fn label(&self) -> &'static str {
        "Documents obligatoires fournis"
    }

    async fn check(
        &self,
        org_id: i64,
        subject: &str,
    ) -> Result<ChecklistItem, BackendError> {
        let kinds = self.store.document_kinds(org_id, subject).await?;
        let missing = REQUIRED_DOCUMENT_KINDS
            .iter()
            .filter(|required| !kinds.iter().any(|kind| kind == *required))
            .copied()
            .collect::<Vec<_>>();
        Ok(match missing.is_empty() {
            true => ChecklistItem::new(
                self.key(),
                self.label(),
                ItemStatus::Ok,
                None,
            ),
            false => ChecklistItem::new(
                self.key(),
                self.label(),
                ItemStatus::Missing,
                Some(missing.join(", ")),
            ),
        })
    }
}

/// Every material choice for the subject has been settled at least to
/// `confirmed`; stragglers are advisory rather than hard misses.
pub struct ConfirmedChoicesProbe {
    platform: Platform,
}

impl ConfirmedChoicesProbe {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl ChecklistProbe for ConfirmedChoicesProbe {
    fn key(&self) -> &'static str {
        "MATERIAL_CHOICES"
    }

    fn label(&self) -> &'static str {
        "Choix matériaux finalisés"
    }

    async fn check(
        &self,
        org_id: i64,
        subject: &str,
    ) -> Result<ChecklistItem, BackendError> {
        let instances = self.platform.flow_platform().list_instances(
            &InstanceFilter::new()
                .kind(WorkflowKind::MaterialChoice)
                .org_id(org_id)
                .subject(subject)
        ).await?;
        let pending = instances
            .iter()
            .filter(|instance| !CONFIRMED_OR_LATER
                .contains(&instance.state.as_str()))
            .map(|instance| instance.id.to_string())
            .collect::<Vec<_>>();
        Ok(match pending.is_empty() {
            true => ChecklistItem::new(
                self.key(),
                self.label(),
                ItemStatus::Ok,
                None,
            ),
            false => ChecklistItem::new(
                self.key(),
                self.label(),
                ItemStatus::Warning,
                Some(pending.join(", ")),
            ),
        })
    }
}

/// No mandatory invoice for the subject may remain unpaid.
pub struct MandatoryInvoicesProbe {
    store: Arc<dyn InvoiceStore>,
}

impl MandatoryInvoicesProbe {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChecklistProbe for MandatoryInvoicesProbe {
    fn key(&self) -> &'static str {
        "MANDATORY_INVOICES"
    }

    fn label(&self) -> &'static str {
        "Acomptes obligatoires réglés"
    }

    async fn check(
        &self,
        org_id: i64,
        subject: &str,
    ) -> Result<ChecklistItem, BackendError> {
        let unpaid = self.store.unpaid_mandatory(org_id, subject).await?;
        Ok(match unpaid.is_empty() {
            true => ChecklistItem::new(
                self.key(),
                self.label(),
                ItemStatus::Ok,
                None,
            ),
            false => ChecklistItem::new(
                self.key(),
                self.label(),
                ItemStatus::Missing,
                Some(unpaid.join(", ")),
            ),
        })
    }
}
