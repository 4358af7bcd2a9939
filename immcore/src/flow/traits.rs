use async_trait::async_trait;
use crate::error::BackendError;
use super::{
    InstanceFilter,
    TransitionRecord,
    TransitionRecords,
    WorkflowInstance,
    WorkflowInstances,
    WorkflowKind,
};

#[async_trait]
pub trait InstanceBackend {
    async fn create_instance(
        &self,
        kind: WorkflowKind,
        org_id: i64,
        project_id: Option<i64>,
        subject: &str,
        state: &str,
        metadata: &serde_json::Value,
    ) -> Result<i64, BackendError>;
    async fn get_instance(
        &self,
        id: i64,
    ) -> Result<Option<WorkflowInstance>, BackendError>;
    /// The most recently created instance bound to this subject under
    /// the given organization, regardless of its state.
    async fn get_instance_for_subject(
        &self,
        kind: WorkflowKind,
        org_id: i64,
        subject: &str,
    ) -> Result<Option<WorkflowInstance>, BackendError>;
    /// The compare-and-swap the whole engine serializes on: move the
    /// instance to `state` and bump its version iff the stored version
    /// still equals `expected_version`.  `None` signals that some
    /// other writer got there first and nothing was changed.
    async fn update_instance(
        &self,
        id: i64,
        expected_version: i64,
        state: &str,
        metadata: &serde_json::Value,
    ) -> Result<Option<WorkflowInstance>, BackendError>;
    async fn list_instances(
        &self,
        filter: &InstanceFilter,
    ) -> Result<WorkflowInstances, BackendError>;
}

#[async_trait]
pub trait HistoryBackend {
    /// Append one record to the instance's history.  The incoming
    /// record carries no id or timestamp; the backend assigns both and
    /// returns the completed entry.
    async fn append_record(
        &self,
        record: TransitionRecord,
    ) -> Result<TransitionRecord, BackendError>;
    /// The full history of the instance, oldest first.
    async fn get_records(
        &self,
        instance_id: i64,
    ) -> Result<TransitionRecords, BackendError>;
}
