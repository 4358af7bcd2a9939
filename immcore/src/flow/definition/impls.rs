use std::collections::{
    HashMap,
    HashSet,
};
use crate::error::DefinitionError;
use super::builtin;
use super::*;

impl WorkflowDefinition {
    pub fn state_info(&self, name: &str) -> Option<&StateInfo> {
        self.states
            .iter()
            .find(|info| info.name == name)
    }

    pub fn is_terminal(&self, state: &str) -> bool {
        self.terminal
            .iter()
            .any(|name| *name == state)
    }

    /// All transitions leaving the given state, in declaration order.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a str,
    ) -> impl Iterator<Item = &'a Transition> {
        self.transitions
            .iter()
            .filter(move |transition| transition.from == state)
    }

    /// The named transition out of the given state, if declared.
    pub fn transition(&self, state: &str, name: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|transition| {
                transition.from == state && transition.name == name
            })
    }

    /// Structural integrity checks for the definition table; any
    /// failure here is a defect in the table itself.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut declared = HashSet::new();
        for info in self.states.iter() {
            if !declared.insert(info.name) {
                return Err(DefinitionError::DuplicateState {
                    kind: self.kind,
                    state: info.name.to_string(),
                });
            }
        }

        if !declared.contains(self.initial) {
            return Err(DefinitionError::UnknownInitial {
                kind: self.kind,
                state: self.initial.to_string(),
            });
        }
        for name in self.terminal.iter() {
            if !declared.contains(name) {
                return Err(DefinitionError::UnknownTerminal {
                    kind: self.kind,
                    state: name.to_string(),
                });
            }
        }

        let mut edges = HashSet::new();
        for transition in self.transitions.iter() {
            if !edges.insert((transition.from, transition.name)) {
                return Err(DefinitionError::DuplicateTransition {
                    kind: self.kind,
                    state: transition.from.to_string(),
                    name: transition.name.to_string(),
                });
            }
            for state in [transition.from, transition.target] {
                if !declared.contains(state) {
                    return Err(DefinitionError::UndeclaredState {
                        kind: self.kind,
                        name: transition.name.to_string(),
                        state: state.to_string(),
                    });
                }
            }
            if self.is_terminal(transition.from) {
                return Err(DefinitionError::TerminalOutbound {
                    kind: self.kind,
                    state: transition.from.to_string(),
                });
            }
        }

        for info in self.states.iter() {
            if !self.is_terminal(info.name)
                && self.transitions_from(info.name).next().is_none()
            {
                return Err(DefinitionError::DeadEnd {
                    kind: self.kind,
                    state: info.name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl DefinitionRegistry {
    pub fn new(
        definitions: impl IntoIterator<Item = WorkflowDefinition>,
    ) -> Result<Self, DefinitionError> {
        let mut results = HashMap::new();
        for definition in definitions {
            definition.validate()?;
            let kind = definition.kind;
            if results.insert(kind, definition).is_some() {
                return Err(DefinitionError::DuplicateDefinition(kind));
            }
        }
        Ok(Self(results))
    }

    /// The definitions every deployment carries.
    pub fn builtin() -> Result<Self, DefinitionError> {
        Self::new([
            builtin::buyer_sale_pipeline(),
            builtin::notary_dossier(),
            builtin::avenant(),
            builtin::sav_ticket(),
            builtin::invoice(),
            builtin::material_choice(),
        ])
    }

    pub fn get(&self, kind: WorkflowKind) -> Option<&WorkflowDefinition> {
        self.0.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowDefinition> {
        self.0.values()
    }
}

#[cfg(test)]
mod test {
    use crate::ac::{
        permission::Permissions,
        role::{
            Role,
            Roles,
        },
    };
    use crate::error::DefinitionError;
    use crate::flow::{
        definition::{
            DisplayHint,
            StateInfo,
            Transition,
        },
        DefinitionRegistry,
        WorkflowDefinition,
        WorkflowKind,
    };

    fn state(name: &'static str) -> StateInfo {
        StateInfo {
            name,
            label: name,
            hint: DisplayHint::Neutral,
        }
    }

    fn edge(
        name: &'static str,
        from: &'static str,
        target: &'static str,
    ) -> Transition {
        Transition {
            name,
            from,
            target,
            description: "".to_string(),
            roles: Roles::from([Role::OrgAdmin]),
            permits: Permissions::empty(),
            actions: vec![],
            precondition: None,
        }
    }

    #[test]
    fn builtin_tables_validate() -> anyhow::Result<()> {
        let registry = DefinitionRegistry::builtin()?;
        assert_eq!(registry.iter().count(), 6);
        let pipeline = registry.get(WorkflowKind::BuyerSalePipeline)
            .expect("definition present");
        assert_eq!(pipeline.initial, "PROSPECT");
        assert!(pipeline.is_terminal("DELIVERED"));
        assert!(registry.get(WorkflowKind::Unknown).is_none());
        Ok(())
    }

    #[test]
    fn validate_duplicate_state() {
        let definition = WorkflowDefinition {
            kind: WorkflowKind::Avenant,
            states: vec![state("draft"), state("draft")],
            initial: "draft",
            terminal: &["draft"],
            transitions: vec![],
        };
        assert!(matches!(
            definition.validate().expect_err("should be an error"),
            DefinitionError::DuplicateState { state, .. } if state == "draft",
        ));
    }

    #[test]
    fn validate_duplicate_transition() {
        let definition = WorkflowDefinition {
            kind: WorkflowKind::Avenant,
            states: vec![state("draft"), state("sent")],
            initial: "draft",
            terminal: &["sent"],
            transitions: vec![
                edge("send", "draft", "sent"),
                edge("send", "draft", "sent"),
            ],
        };
        assert!(matches!(
            definition.validate().expect_err("should be an error"),
            DefinitionError::DuplicateTransition { name, .. } if name == "send",
        ));
    }

    #[test]
    fn validate_undeclared_target() {
        let definition = WorkflowDefinition {
            kind: WorkflowKind::Avenant,
            states: vec![state("draft"), state("sent")],
            initial: "draft",
            terminal: &["sent"],
            transitions: vec![edge("send", "draft", "lost")],
        };
        assert!(matches!(
            definition.validate().expect_err("should be an error"),
            DefinitionError::UndeclaredState { state, .. } if state == "lost",
        ));
    }

    #[test]
    fn validate_terminal_outbound() {
        let definition = WorkflowDefinition {
            kind: WorkflowKind::Avenant,
            states: vec![state("draft"), state("sent")],
            initial: "draft",
            terminal: &["sent"],
            transitions: vec![
                edge("send", "draft", "sent"),
                edge("resend", "sent", "draft"),
            ],
        };
        assert!(matches!(
            definition.validate().expect_err("should be an error"),
            DefinitionError::TerminalOutbound { state, .. } if state == "sent",
        ));
    }

    #[test]
    fn validate_dead_end() {
        let definition = WorkflowDefinition {
            kind: WorkflowKind::Avenant,
            states: vec![state("draft"), state("sent"), state("lost")],
            initial: "draft",
            terminal: &["sent"],
            transitions: vec![edge("send", "draft", "sent")],
        };
        assert!(matches!(
            definition.validate().expect_err("should be an error"),
            DefinitionError::DeadEnd { state, .. } if state == "lost",
        ));
    }

    #[test]
    fn lookups() -> anyhow::Result<()> {
        let registry = DefinitionRegistry::builtin()?;
        let dossier = registry.get(WorkflowKind::NotaryDossier)
            .expect("definition present");

        let submit = dossier.transition("incomplete", "submit_to_notary")
            .expect("transition present");
        assert_eq!(submit.target, "waiting_notary");
        assert!(dossier.transition("incomplete", "sign_act").is_none());
        assert!(dossier.transition("signed", "submit_to_notary").is_none());

        // the drafting loop is re-entrant
        assert_eq!(
            dossier.transition("act_v1", "revise_act")
                .expect("transition present")
                .target,
            "act_v2",
        );
        assert_eq!(
            dossier.transition("act_v2", "request_changes")
                .expect("transition present")
                .target,
            "act_v1",
        );

        let names = dossier.transitions_from("act_v2")
            .map(|transition| transition.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["request_changes", "finalize_act"]);
        Ok(())
    }
}
