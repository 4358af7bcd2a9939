use immcore::{
    ac::actor::Actor,
    checklist::{
        ReadinessResult,
        traits::{
            DocumentStore,
            InvoiceStore,
        },
    },
    dispatch::{
        ActionContext,
        ActionResult,
        traits::ActionDispatcher,
    },
    error::BackendError,
    flow::{
        DefinitionRegistry,
        InstanceFilter,
        Transition,
        TransitionOutcome,
        TransitionRecord,
        TransitionRecords,
        WorkflowDefinition,
        WorkflowInstance,
        WorkflowInstances,
        WorkflowKind,
    },
    platform::FlowPlatform,
};
use std::sync::Arc;

use crate::{
    error::{
        Denial,
        Error,
    },
    guard::{
        self,
        Facts,
    },
    readiness::{
        self,
        ChecklistProbe,
        ConfirmedChoicesProbe,
        MandatoryInvoicesProbe,
        RequiredDocumentsProbe,
    },
};

use super::*;

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flow_platform(mut self, val: impl FlowPlatform + 'static) -> Self {
        self.flow_platform = Some(Box::new(val));
        self
    }

    pub fn dispatcher(mut self, val: impl ActionDispatcher + 'static) -> Self {
        self.dispatcher = Some(Arc::new(val));
        self
    }

    pub fn document_store(mut self, val: impl DocumentStore + 'static) -> Self {
        self.document_store = Some(Arc::new(val));
        self
    }

    pub fn invoice_store(mut self, val: impl InvoiceStore + 'static) -> Self {
        self.invoice_store = Some(Arc::new(val));
        self
    }

    pub fn registry(mut self, val: DefinitionRegistry) -> Self {
        self.registry = Some(val);
        self
    }

    pub fn build(self) -> Platform {
        Platform(Arc::new(PlatformInner {
            flow_platform: self.flow_platform
                .expect("missing required argument flow_platform"),
            dispatcher: self.dispatcher
                .expect("missing required argument dispatcher"),
            document_store: self.document_store,
            invoice_store: self.invoice_store,
            registry: self.registry
                .unwrap_or_else(|| DefinitionRegistry::builtin()
                    .expect("the built-in definitions validate")),
        }))
    }
}

impl Platform {
    pub(crate) fn flow_platform(&self) -> &dyn FlowPlatform {
        self.0.flow_platform.as_ref()
    }
}

// Definition management.
impl Platform {
    pub fn definitions(&self) -> impl Iterator<Item = &WorkflowDefinition> {
        self.0.registry.iter()
    }

    pub fn definition(
        &self,
        kind: WorkflowKind,
    ) -> Result<&WorkflowDefinition, Error> {
        self.0.registry.get(kind)
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))
    }
}

// Instance management.
impl Platform {
    pub async fn start_instance(
        &self,
        actor: &Actor,
        kind: WorkflowKind,
        subject: &str,
        project_id: Option<i64>,
        metadata: serde_json::Value,
        on_duplicate: OnDuplicate,
    ) -> Result<WorkflowInstance, Error> {
        let definition = self.definition(kind)?;
        // an instance already parked in a terminal state never blocks
        // a fresh start for the same subject
        if let Some(existing) = self.0.flow_platform.get_instance_for_subject(
            kind,
            actor.org_id,
            subject,
        ).await? {
            if !definition.is_terminal(&existing.state) {
                return match on_duplicate {
                    OnDuplicate::ReuseExisting => Ok(existing),
                    OnDuplicate::Reject => Err(Error::Duplicate {
                        existing: existing.id,
                    }),
                };
            }
        }
        let id = self.0.flow_platform.create_instance(
            kind,
            actor.org_id,
            project_id,
            subject,
            definition.initial,
            &metadata,
        ).await?;
        Ok(self.0.flow_platform.get_instance(id).await?
            .expect("the instance should have been created"))
    }

    pub async fn instance(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<WorkflowInstance, Error> {
        let instance = self.0.flow_platform.get_instance(id).await?
            .ok_or(Error::NotFound(id))?;
        if actor.org_id != instance.org_id {
            return Err(Error::Denied(Denial::TenantMismatch));
        }
        Ok(instance)
    }

    pub async fn instances(
        &self,
        actor: &Actor,
        filter: InstanceFilter,
    ) -> Result<WorkflowInstances, Error> {
        // whatever the caller asked for, the listing stays inside
        // their own organization
        let filter = filter.org_id(actor.org_id);
        Ok(self.0.flow_platform.list_instances(&filter).await?)
    }

    pub async fn history(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<TransitionRecords, Error> {
        self.instance(actor, id).await?;
        Ok(self.0.flow_platform.get_records(id).await?)
    }
}

// Transition management.
impl Platform {
    pub async fn transition(
        &self,
        actor: &Actor,
        id: i64,
        name: &str,
        expected_version: i64,
        facts: &Facts,
        note: Option<String>,
    ) -> Result<(WorkflowInstance, TransitionRecord), Error> {
        let instance = self.0.flow_platform.get_instance(id).await?
            .ok_or(Error::NotFound(id))?;
        // fail fast before anything is recorded; the caller reloads
        // and retries with fresh state
        if instance.version != expected_version {
            return Err(Error::VersionConflict {
                expected: expected_version,
                actual: instance.version,
            });
        }
        let definition = self.definition(instance.kind)?;
        let transition = match guard::authorize(
            definition,
            &instance,
            name,
            actor,
            facts,
        ) {
            Ok(transition) => transition,
            Err(denial) => {
                self.0.flow_platform.append_record(TransitionRecord {
                    instance_id: instance.id,
                    transition: name.to_string(),
                    from_state: instance.state.clone(),
                    to_state: instance.state.clone(),
                    outcome: TransitionOutcome::RejectedByGuard,
                    actor_id: actor.id,
                    actor_roles: actor.roles,
                    note: Some(denial.to_string()),
                    .. Default::default()
                }).await?;
                return Err(Error::Denied(denial));
            }
        };
        let (results, first_failure) = self.run_actions(
            &instance,
            transition,
            actor.id,
            &[],
        ).await;
        match first_failure {
            Some(failed) => {
                self.append_action_failed(
                    &instance,
                    transition.name,
                    actor,
                    results,
                ).await?;
                Err(Error::ActionFailed {
                    action: failed.action,
                    message: failed.message
                        .unwrap_or_else(|| "unspecified failure".to_string()),
                    retryable: failed.retryable,
                })
            }
            None => self.commit_applied(
                &instance,
                transition,
                actor,
                results,
                note,
            ).await,
        }
    }

    pub async fn approve(
        &self,
        actor: &Actor,
        id: i64,
        expected_version: i64,
        facts: &Facts,
    ) -> Result<(WorkflowInstance, TransitionRecord), Error> {
        self.transition(actor, id, "approve", expected_version, facts, None).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        id: i64,
        expected_version: i64,
        facts: &Facts,
    ) -> Result<(WorkflowInstance, TransitionRecord), Error> {
        self.transition(actor, id, "reject", expected_version, facts, None).await
    }

    pub async fn cancel(
        &self,
        actor: &Actor,
        id: i64,
        expected_version: i64,
        facts: &Facts,
    ) -> Result<(WorkflowInstance, TransitionRecord), Error> {
        self.transition(actor, id, "cancel", expected_version, facts, None).await
    }
}

// Maintenance.
impl Platform {
    /// Re-run the retryable leftovers of the latest failed transition
    /// attempt and, if everything now succeeds, commit the state
    /// change that attempt intended.  Guards are not re-evaluated;
    /// they already passed when the attempt was accepted.
    pub async fn execute_pending_actions(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<(WorkflowInstance, TransitionRecord), Error> {
        let instance = self.0.flow_platform.get_instance(id).await?
            .ok_or(Error::NotFound(id))?;
        if actor.org_id != instance.org_id {
            return Err(Error::Denied(Denial::TenantMismatch));
        }
        let records = self.0.flow_platform.get_records(id).await?;
        let last = records.last()
            .filter(|record| record.outcome == TransitionOutcome::ActionFailed)
            .ok_or(Error::NoPendingActions(id))?;
        let prior: Vec<ActionResult> = match last.action_results.as_ref() {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| BackendError::AppInvariantViolation(e.to_string()))?,
            None => Vec::new(),
        };
        // only failures that were worth retrying qualify; a permanent
        // failure stays with the operator
        if prior.iter().any(|result| !result.success && !result.retryable)
            || !prior.iter().any(|result| !result.success && result.retryable)
        {
            return Err(Error::NoPendingActions(id));
        }
        let definition = self.definition(instance.kind)?;
        let transition = definition
            .transition(&instance.state, &last.transition)
            .ok_or_else(|| Error::Denied(Denial::InvalidTransition {
                state: instance.state.clone(),
                transition: last.transition.clone(),
            }))?;
        let (results, first_failure) = self.run_actions(
            &instance,
            transition,
            actor.id,
            &prior,
        ).await;
        match first_failure {
            Some(failed) => {
                self.append_action_failed(
                    &instance,
                    transition.name,
                    actor,
                    results,
                ).await?;
                Err(Error::ActionFailed {
                    action: failed.action,
                    message: failed.message
                        .unwrap_or_else(|| "unspecified failure".to_string()),
                    retryable: failed.retryable,
                })
            }
            None => self.commit_applied(
                &instance,
                transition,
                actor,
                results,
                None,
            ).await,
        }
    }
}

// Readiness.
impl Platform {
    /// Evaluate the subject's checklist with every probe this platform
    /// has collaborators for.
    pub async fn readiness(
        &self,
        actor: &Actor,
        subject: &str,
    ) -> Result<ReadinessResult, Error> {
        let mut probes: Vec<Box<dyn ChecklistProbe>> = Vec::new();
        if let Some(store) = self.0.document_store.as_ref() {
            probes.push(Box::new(RequiredDocumentsProbe::new(store.clone())));
        }
        probes.push(Box::new(ConfirmedChoicesProbe::new(self.clone())));
        if let Some(store) = self.0.invoice_store.as_ref() {
            probes.push(Box::new(MandatoryInvoicesProbe::new(store.clone())));
        }
        Ok(readiness::compute(subject, actor.org_id, &probes).await)
    }
}

// Internal plumbing shared by the transition and maintenance paths.
impl Platform {
    /// Walk the transition's actions in declaration order.  Actions
    /// that already succeeded in `prior` are carried over instead of
    /// re-running; a hard failure stops the walk, soft failures let it
    /// continue so the full damage is on record.
    async fn run_actions(
        &self,
        instance: &WorkflowInstance,
        transition: &Transition,
        actor_id: i64,
        prior: &[ActionResult],
    ) -> (Vec<ActionResult>, Option<ActionResult>) {
        let mut results = Vec::with_capacity(transition.actions.len());
        let mut first_failure: Option<ActionResult> = None;
        for action in transition.actions.iter() {
            if let Some(done) = prior.iter()
                .find(|result| result.action == action.name && result.success)
            {
                results.push(done.clone());
                continue;
            }
            let ctx = ActionContext::new(instance, transition, actor_id, action);
            let result = match self.0.dispatcher.execute(action, &ctx).await {
                Ok(result) => result,
                // transport trouble reads as a retryable failure
                Err(e) => {
                    log::warn!(
                        "dispatcher failed to run action {}: {e}",
                        action.name,
                    );
                    ActionResult::failed(action.name, true, e.to_string())
                }
            };
            let hard_failure = !result.success && !result.retryable;
            if !result.success && first_failure.is_none() {
                first_failure = Some(result.clone());
            }
            results.push(result);
            if hard_failure {
                break;
            }
        }
        (results, first_failure)
    }

    async fn commit_applied(
        &self,
        instance: &WorkflowInstance,
        transition: &Transition,
        actor: &Actor,
        results: Vec<ActionResult>,
        note: Option<String>,
    ) -> Result<(WorkflowInstance, TransitionRecord), Error> {
        let updated = match self.0.flow_platform.update_instance(
            instance.id,
            instance.version,
            transition.target,
            &instance.metadata,
        ).await? {
            Some(updated) => updated,
            // a concurrent writer got there first; effects may have
            // fired, which is what the dedup token is for
            None => {
                let actual = self.0.flow_platform.get_instance(instance.id)
                    .await?
                    .ok_or(Error::NotFound(instance.id))?
                    .version;
                return Err(Error::VersionConflict {
                    expected: instance.version,
                    actual,
                });
            }
        };
        let record = self.0.flow_platform.append_record(TransitionRecord {
            instance_id: updated.id,
            transition: transition.name.to_string(),
            from_state: instance.state.clone(),
            to_state: updated.state.clone(),
            outcome: TransitionOutcome::Applied,
            actor_id: actor.id,
            actor_roles: actor.roles,
            action_results: action_results_value(&results)?,
            note,
            .. Default::default()
        }).await?;
        Ok((updated, record))
    }

    async fn append_action_failed(
        &self,
        instance: &WorkflowInstance,
        transition_name: &str,
        actor: &Actor,
        results: Vec<ActionResult>,
    ) -> Result<(), Error> {
        self.0.flow_platform.append_record(TransitionRecord {
            instance_id: instance.id,
            transition: transition_name.to_string(),
            from_state: instance.state.clone(),
            to_state: instance.state.clone(),
            outcome: TransitionOutcome::ActionFailed,
            actor_id: actor.id,
            actor_roles: actor.roles,
            action_results: action_results_value(&results)?,
            note: None,
            .. Default::default()
        }).await?;
        Ok(())
    }
}

fn action_results_value(
    results: &[ActionResult],
) -> Result<Option<serde_json::Value>, BackendError> {
    Ok(match results.is_empty() {
        true => None,
        false => Some(serde_json::to_value(results)
            .map_err(|e| BackendError::AppInvariantViolation(e.to_string()))?),
    })
}
