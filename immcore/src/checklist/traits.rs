use async_trait::async_trait;
use crate::error::BackendError;

/// Access to the document archive consulted by readiness probes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The document kinds already on file for the subject.
    async fn document_kinds(
        &self,
        org_id: i64,
        subject: &str,
    ) -> Result<Vec<String>, BackendError>;
}

/// Access to the billing records consulted by readiness probes.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// References of mandatory invoices that remain unpaid for the
    /// subject.
    async fn unpaid_mandatory(
        &self,
        org_id: i64,
        subject: &str,
    ) -> Result<Vec<String>, BackendError>;
}
