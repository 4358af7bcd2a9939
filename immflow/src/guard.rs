use immcore::{
    ac::actor::Actor,
    checklist::ReadinessResult,
    flow::{
        Transition,
        WorkflowDefinition,
        WorkflowInstance,
        definition::Precondition,
    },
};

use crate::error::Denial;

/// Caller-supplied facts a precondition may consult.
///
/// The guard never gathers these itself; whoever drives the engine
/// decides what to evaluate and when.  A `SubjectReady` edge checked
/// without a readiness result fails with an `unevaluated` marker.
#[derive(Clone, Debug, Default)]
pub struct Facts {
    pub readiness: Option<ReadinessResult>,
    pub past_due: bool,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readiness(mut self, val: ReadinessResult) -> Self {
        self.readiness = Some(val);
        self
    }

    pub fn past_due(mut self, val: bool) -> Self {
        self.past_due = val;
        self
    }
}

/// Decide whether the actor may apply the named transition to the
/// instance, in strict order: tenancy, then the graph, then
/// authorization, then preconditions.  The first check that fails is
/// the one reported; pure, no I/O.
pub fn authorize<'a>(
    definition: &'a WorkflowDefinition,
    instance: &WorkflowInstance,
    transition: &str,
    actor: &Actor,
    facts: &Facts,
) -> Result<&'a Transition, Denial> {
    if actor.org_id != instance.org_id {
        return Err(Denial::TenantMismatch);
    }

    let transition = definition
        .transition(&instance.state, transition)
        .ok_or_else(|| Denial::InvalidTransition {
            state: instance.state.clone(),
            transition: transition.to_string(),
        })?;

    // either path suffices: holding one of the named roles, or holding
    // every named permission.  An empty permission set opens no path.
    let role_path = !actor.roles.0.is_disjoint(transition.roles.0);
    let permit_path = !transition.permits.is_empty()
        && actor.permits().is_superset(transition.permits);
    if !role_path && !permit_path {
        return Err(Denial::Forbidden {
            transition: transition.name.to_string(),
        });
    }

    match transition.precondition {
        Some(Precondition::SubjectReady) => {
            match facts.readiness.as_ref() {
                Some(result) if result.ready => Ok(transition),
                Some(result) => Err(Denial::PreconditionFailed {
                    items: result.failing()
                        .map(|item| item.key.clone())
                        .collect(),
                }),
                None => Err(Denial::PreconditionFailed {
                    items: vec!["unevaluated".to_string()],
                }),
            }
        }
        Some(Precondition::PastDue) if !facts.past_due => {
            Err(Denial::PreconditionFailed {
                items: vec!["past_due".to_string()],
            })
        }
        _ => Ok(transition),
    }
}

#[cfg(test)]
mod test {
    use immcore::{
        ac::{
            actor::Actor,
            role::Role,
        },
        checklist::{
            ChecklistItem,
            ItemStatus,
            ReadinessResult,
        },
        flow::{
            DefinitionRegistry,
            WorkflowInstance,
            WorkflowKind,
        },
    };

    use crate::error::Denial;
    use super::{
        Facts,
        authorize,
    };

    fn instance(kind: WorkflowKind, state: &str, org_id: i64) -> WorkflowInstance {
        WorkflowInstance {
            id: 1,
            kind,
            org_id,
            project_id: None,
            subject: "lot/1".to_string(),
            state: state.to_string(),
            version: 0,
            metadata: serde_json::json!({}),
            created_ts: 0,
            updated_ts: 0,
        }
    }

    #[test]
    fn tenant_mismatch_first() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::BuyerSalePipeline).unwrap();
        let instance = instance(WorkflowKind::BuyerSalePipeline, "PROSPECT", 1);
        // even an admin asking for a nonexistent transition gets the
        // tenancy answer, nothing else
        let actor = Actor::new(1, 2, [Role::SaasAdmin]);
        assert_eq!(
            authorize(definition, &instance, "no_such", &actor, &Facts::new()),
            Err(Denial::TenantMismatch),
        );
    }

    #[test]
    fn invalid_transition_before_forbidden() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::BuyerSalePipeline).unwrap();
        let instance = instance(WorkflowKind::BuyerSalePipeline, "PROSPECT", 1);
        // deliver exists in the definition, just not from PROSPECT, and
        // the actor would not be allowed to use it anyway
        let actor = Actor::new(1, 1, [Role::Buyer]);
        assert_eq!(
            authorize(definition, &instance, "deliver", &actor, &Facts::new()),
            Err(Denial::InvalidTransition {
                state: "PROSPECT".to_string(),
                transition: "deliver".to_string(),
            }),
        );
    }

    #[test]
    fn terminal_states_deny_everything() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::BuyerSalePipeline).unwrap();
        let instance = instance(WorkflowKind::BuyerSalePipeline, "DELIVERED", 1);
        let actor = Actor::new(1, 1, [Role::OrgAdmin]);
        assert!(matches!(
            authorize(definition, &instance, "reserve", &actor, &Facts::new()),
            Err(Denial::InvalidTransition { .. }),
        ));
    }

    #[test]
    fn forbidden_before_precondition() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::NotaryDossier).unwrap();
        let instance = instance(WorkflowKind::NotaryDossier, "incomplete", 1);
        // submit_to_notary carries a readiness precondition, but a
        // buyer must be turned away before it is even looked at
        let actor = Actor::new(1, 1, [Role::Buyer]);
        assert_eq!(
            authorize(definition, &instance, "submit_to_notary", &actor, &Facts::new()),
            Err(Denial::Forbidden {
                transition: "submit_to_notary".to_string(),
            }),
        );
    }

    #[test]
    fn role_path() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::BuyerSalePipeline).unwrap();
        let instance = instance(WorkflowKind::BuyerSalePipeline, "PROSPECT", 1);

        let promoter = Actor::new(1, 1, [Role::Promoter]);
        let transition = authorize(
            definition, &instance, "reserve", &promoter, &Facts::new())
            .unwrap();
        assert_eq!(transition.target, "RESERVED");

        let buyer = Actor::new(2, 1, [Role::Buyer]);
        assert!(authorize(
            definition, &instance, "reserve", &buyer, &Facts::new()).is_err());
    }

    #[test]
    fn permission_path() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::Invoice).unwrap();
        let instance = instance(WorkflowKind::Invoice, "pending", 1);

        // settle names no roles at all; only the approve-payment
        // permission opens it
        let org_admin = Actor::new(1, 1, [Role::OrgAdmin]);
        assert!(authorize(
            definition, &instance, "settle", &org_admin, &Facts::new()).is_ok());

        let promoter = Actor::new(2, 1, [Role::Promoter]);
        assert_eq!(
            authorize(definition, &instance, "settle", &promoter, &Facts::new()),
            Err(Denial::Forbidden {
                transition: "settle".to_string(),
            }),
        );
    }

    #[test]
    fn subject_ready_requires_evaluation() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::NotaryDossier).unwrap();
        let instance = instance(WorkflowKind::NotaryDossier, "incomplete", 1);
        let actor = Actor::new(1, 1, [Role::Promoter]);

        assert_eq!(
            authorize(definition, &instance, "submit_to_notary", &actor, &Facts::new()),
            Err(Denial::PreconditionFailed {
                items: vec!["unevaluated".to_string()],
            }),
        );
    }

    #[test]
    fn subject_ready_reports_failing_items() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::NotaryDossier).unwrap();
        let instance = instance(WorkflowKind::NotaryDossier, "incomplete", 1);
        let actor = Actor::new(1, 1, [Role::Promoter]);

        let facts = Facts::new().readiness(ReadinessResult::new("lot/1", vec![
            ChecklistItem::new("DOCS_REQUIRED", "", ItemStatus::Missing, None),
            ChecklistItem::new("MANDATORY_INVOICES", "", ItemStatus::Ok, None),
        ]));
        assert_eq!(
            authorize(definition, &instance, "submit_to_notary", &actor, &facts),
            Err(Denial::PreconditionFailed {
                items: vec!["DOCS_REQUIRED".to_string()],
            }),
        );

        let facts = Facts::new().readiness(ReadinessResult::new("lot/1", vec![
            ChecklistItem::new("DOCS_REQUIRED", "", ItemStatus::Ok, None),
        ]));
        assert!(authorize(
            definition, &instance, "submit_to_notary", &actor, &facts).is_ok());
    }

    #[test]
    fn past_due_is_asserted_by_the_caller() {
        let registry = DefinitionRegistry::builtin().unwrap();
        let definition = registry.get(WorkflowKind::Invoice).unwrap();
        let instance = instance(WorkflowKind::Invoice, "pending", 1);
        let actor = Actor::new(1, 1, [Role::Promoter]);

        assert_eq!(
            authorize(definition, &instance, "mark_late", &actor, &Facts::new()),
            Err(Denial::PreconditionFailed {
                items: vec!["past_due".to_string()],
            }),
        );
        assert!(authorize(
            definition, &instance, "mark_late", &actor,
            &Facts::new().past_due(true)).is_ok());
    }
}
