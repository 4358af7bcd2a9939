use async_trait::async_trait;
use mockall::mock;
use immcore::{
    checklist::traits::{
        DocumentStore,
        InvoiceStore,
    },
    dispatch::{
        ActionContext,
        ActionRef,
        ActionResult,
        traits::ActionDispatcher,
    },
    error::BackendError,
    flow::{
        InstanceFilter,
        TransitionRecord,
        TransitionRecords,
        WorkflowInstance,
        WorkflowInstances,
        WorkflowKind,
        traits::{
            HistoryBackend,
            InstanceBackend,
        },
    },
    platform::{
        DefaultFlowPlatform,
        PlatformUrl,
    },
};

mock! {
    pub Platform {
    }

    #[async_trait]
    impl InstanceBackend for Platform {
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
        async fn get_instance_for_subject(
            &self,
            kind: WorkflowKind,
            org_id: i64,
            subject: &str,
        ) -> Result<Option<WorkflowInstance>, BackendError>;
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
    impl HistoryBackend for Platform {
        async fn append_record(
            &self,
            record: TransitionRecord,
        ) -> Result<TransitionRecord, BackendError>;
        async fn get_records(
            &self,
            instance_id: i64,
        ) -> Result<TransitionRecords, BackendError>;
    }

    impl PlatformUrl for Platform {
        fn url(&self) -> &str;
    }
}

impl DefaultFlowPlatform for MockPlatform {}

mock! {
    pub Dispatcher {
    }

    #[async_trait]
    impl ActionDispatcher for Dispatcher {
        async fn execute(
            &self,
            action: &ActionRef,
            ctx: &ActionContext,
        ) -> Result<ActionResult, BackendError>;
    }
}

mock! {
    pub Documents {
    }

    #[async_trait]
    impl DocumentStore for Documents {
        async fn document_kinds(
            &self,
            org_id: i64,
            subject: &str,
        ) -> Result<Vec<String>, BackendError>;
    }
}

mock! {
    pub Invoices {
    }

    #[async_trait]
    impl InvoiceStore for Invoices {
        async fn unpaid_mandatory(
            &self,
            org_id: i64,
            subject: &str,
        ) -> Result<Vec<String>, BackendError>;
    }
}
