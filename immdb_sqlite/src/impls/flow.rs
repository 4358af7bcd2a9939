use async_trait::async_trait;
use immcore::{
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
};
use sqlx::{
    QueryBuilder,
    Row,
    Sqlite,
    sqlite::SqliteRow,
};
use std::str::FromStr;

use crate::{
    SqliteBackend,
    chrono::Utc,
};


fn row_to_instance(row: SqliteRow) -> Result<WorkflowInstance, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    let metadata: String = row.try_get("metadata")?;
    Ok(WorkflowInstance {
        id: row.try_get("id")?,
        // an unrecognized kind maps to Unknown rather than failing the
        // whole fetch
        kind: WorkflowKind::from_str(&kind).unwrap_or_default(),
        org_id: row.try_get("org_id")?,
        project_id: row.try_get("project_id")?,
        subject: row.try_get("subject")?,
        state: row.try_get("state")?,
        version: row.try_get("version")?,
        metadata: serde_json::from_str(&metadata)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_ts: row.try_get("created_ts")?,
        updated_ts: row.try_get("updated_ts")?,
    })
}

fn row_to_record(row: SqliteRow) -> Result<TransitionRecord, sqlx::Error> {
    let actor_roles: String = row.try_get("actor_roles")?;
    let action_results: Option<String> = row.try_get("action_results")?;
    let action_results = action_results
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(TransitionRecord {
        id: row.try_get("id")?,
        instance_id: row.try_get("instance_id")?,
        transition: row.try_get("transition")?,
        from_state: row.try_get("from_state")?,
        to_state: row.try_get("to_state")?,
        outcome: row.try_get::<i64, _>("outcome")?.into(),
        actor_id: row.try_get("actor_id")?,
        actor_roles: serde_json::from_str(&actor_roles)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        action_results,
        note: row.try_get("note")?,
        created_ts: row.try_get("created_ts")?,
    })
}

async fn create_instance_sqlite(
    backend: &SqliteBackend,
    kind: WorkflowKind,
    org_id: i64,
    project_id: Option<i64>,
    subject: &str,
    state: &str,
    metadata: &serde_json::Value,
) -> Result<i64, BackendError> {
    let ts = Utc::now().timestamp();
    let id = sqlx::query(r#"
INSERT INTO workflow_instance (
    kind,
    org_id,
    project_id,
    subject,
    state,
    version,
    metadata,
    created_ts,
    updated_ts
)
VALUES ( ?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8 )
        "#)
        .bind(kind.to_string())
        .bind(org_id)
        .bind(project_id)
        .bind(subject)
        .bind(state)
        .bind(metadata.to_string())
        .bind(ts)
        .bind(ts)
        .execute(&*backend.pool)
        .await?
        .last_insert_rowid();

    Ok(id)
}

async fn get_instance_sqlite(
    backend: &SqliteBackend,
    id: i64,
) -> Result<Option<WorkflowInstance>, BackendError> {
    let rec = sqlx::query(r#"
SELECT
    id,
    kind,
    org_id,
    project_id,
    subject,
    state,
    version,
    metadata,
    created_ts,
    updated_ts
FROM
    workflow_instance
WHERE
    id = ?1
        "#)
        .bind(id)
        .try_map(row_to_instance)
        .fetch_optional(&*backend.pool)
        .await?;
    Ok(rec)
}

async fn get_instance_for_subject_sqlite(
    backend: &SqliteBackend,
    kind: WorkflowKind,
    org_id: i64,
    subject: &str,
) -> Result<Option<WorkflowInstance>, BackendError> {
    // the query assumes the id is auto-incremented to have the newest
    // instance carry the highest id.
    let rec = sqlx::query(r#"
SELECT
    id,
    kind,
    org_id,
    project_id,
    subject,
    state,
    version,
    metadata,
    created_ts,
    updated_ts
FROM
    workflow_instance
WHERE
    kind = ?1
AND
    org_id = ?2
AND
    subject = ?3
ORDER BY
    id DESC
LIMIT 1
        "#)
        .bind(kind.to_string())
        .bind(org_id)
        .bind(subject)
        .try_map(row_to_instance)
        .fetch_optional(&*backend.pool)
        .await?;
    Ok(rec)
}

async fn update_instance_sqlite(
    backend: &SqliteBackend,
    id: i64,
    expected_version: i64,
    state: &str,
    metadata: &serde_json::Value,
) -> Result<Option<WorkflowInstance>, BackendError> {
    let ts = Utc::now().timestamp();
    // no row comes back when some other writer already bumped the
    // version; the caller decides what a conflict means.
    let rec = sqlx::query(r#"
UPDATE
    workflow_instance
SET
    state = ?3,
    version = version + 1,
    metadata = ?4,
    updated_ts = ?5
WHERE
    id = ?1
AND
    version = ?2
RETURNING
    id,
    kind,
    org_id,
    project_id,
    subject,
    state,
    version,
    metadata,
    created_ts,
    updated_ts
        "#)
        .bind(id)
        .bind(expected_version)
        .bind(state)
        .bind(metadata.to_string())
        .bind(ts)
        .try_map(row_to_instance)
        .fetch_optional(&*backend.pool)
        .await?;
    Ok(rec)
}

async fn list_instances_sqlite(
    backend: &SqliteBackend,
    filter: &InstanceFilter,
) -> Result<WorkflowInstances, BackendError> {
    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(r#"
SELECT
    id,
    kind,
    org_id,
    project_id,
    subject,
    state,
    version,
    metadata,
    created_ts,
    updated_ts
FROM
    workflow_instance
WHERE
    1 = 1"#);

    if let Some(kind) = filter.kind {
        query_builder.push("\nAND kind = ");
        query_builder.push_bind(kind.to_string());
    }
    if let Some(org_id) = filter.org_id {
        query_builder.push("\nAND org_id = ");
        query_builder.push_bind(org_id);
    }
    if let Some(project_id) = filter.project_id {
        query_builder.push("\nAND project_id = ");
        query_builder.push_bind(project_id);
    }
    if let Some(state) = filter.state.as_deref() {
        query_builder.push("\nAND state = ");
        query_builder.push_bind(state);
    }
    if let Some(subject) = filter.subject.as_deref() {
        query_builder.push("\nAND subject = ");
        query_builder.push_bind(subject);
    }
    query_builder.push("\nORDER BY id");

    let recs = query_builder
        .build()
        .try_map(row_to_instance)
        .fetch_all(&*backend.pool)
        .await?;

    Ok(recs.into())
}

async fn append_record_sqlite(
    backend: &SqliteBackend,
    record: TransitionRecord,
) -> Result<TransitionRecord, BackendError> {
    if record.id > 0 {
        return Err(BackendError::AppInvariantViolation(
            format!("record already has id assigned: {}", record.id)
        ));
    }

    let created_ts = Utc::now().timestamp();
    let outcome = i64::from(record.outcome);
    let actor_roles = serde_json::to_string(&record.actor_roles)
        .map_err(|e| BackendError::AppInvariantViolation(e.to_string()))?;
    let action_results = record.action_results
        .as_ref()
        .map(|results| results.to_string());
    let id = sqlx::query(r#"
INSERT INTO transition_record (
    instance_id,
    transition,
    from_state,
    to_state,
    outcome,
    actor_id,
    actor_roles,
    action_results,
    note,
    created_ts
)
VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10 )
        "#)
        .bind(record.instance_id)
        .bind(&record.transition)
        .bind(&record.from_state)
        .bind(&record.to_state)
        .bind(outcome)
        .bind(record.actor_id)
        .bind(actor_roles)
        .bind(action_results)
        .bind(&record.note)
        .bind(created_ts)
        .execute(&*backend.pool)
        .await?
        .last_insert_rowid();

    Ok(TransitionRecord {
        id,
        created_ts,
        .. record
    })
}

async fn get_records_sqlite(
    backend: &SqliteBackend,
    instance_id: i64,
) -> Result<TransitionRecords, BackendError> {
    let recs = sqlx::query(r#"
SELECT
    id,
    instance_id,
    transition,
    from_state,
    to_state,
    outcome,
    actor_id,
    actor_roles,
    action_results,
    note,
    created_ts
FROM
    transition_record
WHERE
    instance_id = ?1
ORDER BY
    id
        "#)
        .bind(instance_id)
        .try_map(row_to_record)
        .fetch_all(&*backend.pool)
        .await?;

    Ok(recs.into())
}

#[async_trait]
impl InstanceBackend for SqliteBackend {
    async fn create_instance(
        &self,
        kind: WorkflowKind,
        org_id: i64,
        project_id: Option<i64>,
        subject: &str,
        state: &str,
        metadata: &serde_json::Value,
    ) -> Result<i64, BackendError> {
        create_instance_sqlite(
            &self,
            kind,
            org_id,
            project_id,
            subject,
            state,
            metadata,
        ).await
    }

    async fn get_instance(
        &self,
        id: i64,
    ) -> Result<Option<WorkflowInstance>, BackendError> {
        get_instance_sqlite(&self, id).await
    }

    async fn get_instance_for_subject(
        &self,
        kind: WorkflowKind,
        org_id: i64,
        subject: &str,
    ) -> Result<Option<WorkflowInstance>, BackendError> {
        get_instance_for_subject_sqlite(
            &self,
            kind,
            org_id,
            subject,
        ).await
    }

    async fn update_instance(
        &self,
        id: i64,
        expected_version: i64,
        state: &str,
        metadata: &serde_json::Value,
    ) -> Result<Option<WorkflowInstance>, BackendError> {
        update_instance_sqlite(
            &self,
            id,
            expected_version,
            state,
            metadata,
        ).await
    }

    async fn list_instances(
        &self,
        filter: &InstanceFilter,
    ) -> Result<WorkflowInstances, BackendError> {
        list_instances_sqlite(&self, filter).await
    }
}

#[async_trait]
impl HistoryBackend for SqliteBackend {
    async fn append_record(
        &self,
        record: TransitionRecord,
    ) -> Result<TransitionRecord, BackendError> {
        append_record_sqlite(&self, record).await
    }

    async fn get_records(
        &self,
        instance_id: i64,
    ) -> Result<TransitionRecords, BackendError> {
        get_records_sqlite(&self, instance_id).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use immcore::{
        ac::role::{
            Role,
            Roles,
        },
        error::BackendError,
        flow::{
            InstanceFilter,
            TransitionOutcome,
            TransitionRecord,
            WorkflowInstance,
            WorkflowKind,
            traits::{
                HistoryBackend,
                InstanceBackend,
            },
        },
        platform::PlatformConnector as _,
    };
    use crate::SqliteBackend;

    pub(crate) async fn make_example_instance(
        backend: &dyn InstanceBackend,
        subject: &str,
    ) -> anyhow::Result<i64> {
        Ok(backend.create_instance(
            WorkflowKind::BuyerSalePipeline,
            1,
            Some(1),
            subject,
            "PROSPECT",
            &serde_json::json!({}),
        ).await?)
    }

    #[async_std::test]
    async fn test_basic() -> anyhow::Result<()> {
        let backend = SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let id = make_example_instance(&backend, "lot/1").await?;
        let ib: &dyn InstanceBackend = &backend;
        let instance = ib.get_instance(id).await?
            .expect("instance just created");
        let answer = WorkflowInstance {
            id: 1,
            kind: WorkflowKind::BuyerSalePipeline,
            org_id: 1,
            project_id: Some(1),
            subject: "lot/1".into(),
            state: "PROSPECT".into(),
            version: 0,
            metadata: serde_json::json!({}),
            created_ts: 1234567890,
            updated_ts: 1234567890,
        };
        assert_eq!(instance, answer);
        assert!(ib.get_instance(42).await?.is_none());
        Ok(())
    }

    #[async_std::test]
    async fn test_update_instance_version_check() -> anyhow::Result<()> {
        let backend = SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let id = make_example_instance(&backend, "lot/1").await?;
        let ib: &dyn InstanceBackend = &backend;

        let updated = ib.update_instance(
            id,
            0,
            "RESERVED",
            &serde_json::json!({"buyer": 7}),
        ).await?
            .expect("version 0 is current");
        assert_eq!(updated.state, "RESERVED");
        assert_eq!(updated.version, 1);
        assert_eq!(updated.metadata, serde_json::json!({"buyer": 7}));

        // a writer still holding version 0 must lose
        let stale = ib.update_instance(
            id,
            0,
            "CONTRACT_PENDING",
            &serde_json::json!({}),
        ).await?;
        assert!(stale.is_none());

        let instance = ib.get_instance(id).await?
            .expect("instance still there");
        assert_eq!(instance.state, "RESERVED");
        assert_eq!(instance.version, 1);
        Ok(())
    }

    #[async_std::test]
    async fn test_get_instance_for_subject_newest() -> anyhow::Result<()> {
        let backend = SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        // note this makes _two_ instances bound to the same subject
        make_example_instance(&backend, "lot/1").await?;
        let id2 = make_example_instance(&backend, "lot/1").await?;
        let ib: &dyn InstanceBackend = &backend;

        let instance = ib.get_instance_for_subject(
            WorkflowKind::BuyerSalePipeline,
            1,
            "lot/1",
        ).await?
            .expect("subject has instances");
        assert_eq!(instance.id, id2);

        // same subject under some other org must not leak through
        assert!(ib.get_instance_for_subject(
            WorkflowKind::BuyerSalePipeline,
            2,
            "lot/1",
        ).await?.is_none());
        Ok(())
    }

    #[async_std::test]
    async fn test_listing() -> anyhow::Result<()> {
        let backend = SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let ib: &dyn InstanceBackend = &backend;
        let id1 = make_example_instance(ib, "lot/1").await?;
        let id2 = make_example_instance(ib, "lot/2").await?;
        ib.create_instance(
            WorkflowKind::SavTicket,
            1,
            Some(2),
            "lot/1",
            "open",
            &serde_json::json!({}),
        ).await?;
        ib.create_instance(
            WorkflowKind::SavTicket,
            2,
            None,
            "lot/9",
            "open",
            &serde_json::json!({}),
        ).await?;

        let all = ib.list_instances(&InstanceFilter::new()).await?;
        assert_eq!(all.len(), 4);

        let sales = ib.list_instances(
            &InstanceFilter::new()
                .kind(WorkflowKind::BuyerSalePipeline)
                .org_id(1)
        ).await?;
        assert_eq!(
            sales.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![id1, id2],
        );

        let tickets = ib.list_instances(
            &InstanceFilter::new()
                .kind(WorkflowKind::SavTicket)
                .org_id(1)
        ).await?;
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].subject, "lot/1");

        let by_project = ib.list_instances(
            &InstanceFilter::new().project_id(2)
        ).await?;
        assert_eq!(by_project.len(), 1);

        let by_state = ib.list_instances(
            &InstanceFilter::new().state("open").subject("lot/9")
        ).await?;
        assert_eq!(by_state.len(), 1);
        assert_eq!(by_state[0].org_id, 2);
        Ok(())
    }

    #[async_std::test]
    async fn test_history_append_and_order() -> anyhow::Result<()> {
        let backend = SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let id = make_example_instance(&backend, "lot/1").await?;
        let hb: &dyn HistoryBackend = &backend;

        let rejected = hb.append_record(TransitionRecord {
            instance_id: id,
            transition: "reserve".into(),
            from_state: "PROSPECT".into(),
            to_state: "PROSPECT".into(),
            outcome: TransitionOutcome::RejectedByGuard,
            actor_id: 2,
            note: Some("FORBIDDEN".into()),
            .. Default::default()
        }).await?;
        assert_eq!(rejected.id, 1);
        assert_eq!(rejected.created_ts, 1234567890);

        let applied = hb.append_record(TransitionRecord {
            instance_id: id,
            transition: "reserve".into(),
            from_state: "PROSPECT".into(),
            to_state: "RESERVED".into(),
            outcome: TransitionOutcome::Applied,
            actor_id: 3,
            actor_roles: Roles::from([Role::Promoter, Role::OrgAdmin]),
            action_results: Some(serde_json::json!([
                {"action": "notify_buyer_reserved", "success": true}
            ])),
            .. Default::default()
        }).await?;
        assert_eq!(applied.id, 2);

        let records = hb.get_records(id).await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, TransitionOutcome::RejectedByGuard);
        assert_eq!(records[0].to_state, records[0].from_state);
        assert_eq!(records[0].actor_roles, Roles::default());
        assert_eq!(records[1].outcome, TransitionOutcome::Applied);
        assert_eq!(
            records[1].actor_roles,
            Roles::from([Role::Promoter, Role::OrgAdmin]),
        );
        assert_eq!(
            records[1].action_results,
            Some(serde_json::json!([
                {"action": "notify_buyer_reserved", "success": true}
            ])),
        );
        Ok(())
    }

    #[async_std::test]
    async fn test_append_rejects_assigned_id() -> anyhow::Result<()> {
        let backend = SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let id = make_example_instance(&backend, "lot/1").await?;
        let hb: &dyn HistoryBackend = &backend;
        let result = hb.append_record(TransitionRecord {
            id: 11,
            instance_id: id,
            transition: "reserve".into(),
            .. Default::default()
        }).await;
        assert!(matches!(
            result,
            Err(BackendError::AppInvariantViolation(_)),
        ));
        Ok(())
    }
}
