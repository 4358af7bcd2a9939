use std::{
    fmt,
    str::FromStr,
};
use crate::error::ValueError;
use crate::flow::{
    Transition,
    WorkflowInstance,
};
use super::{
    ActionContext,
    ActionKind,
    ActionRef,
    ActionResult,
};

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

impl From<ActionKind> for &'static str {
    fn from(kind: ActionKind) -> &'static str {
        match kind {
            ActionKind::Notify => "notify",
            ActionKind::CreateTask => "create_task",
            ActionKind::SendEmail => "send_email",
            ActionKind::ArchiveDocument => "archive_document",
            ActionKind::UpdateLedger => "update_ledger",
            ActionKind::Unknown => "unknown",
        }
    }
}

impl FromStr for ActionKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notify" => Ok(ActionKind::Notify),
            "create_task" => Ok(ActionKind::CreateTask),
            "send_email" => Ok(ActionKind::SendEmail),
            "archive_document" => Ok(ActionKind::ArchiveDocument),
            "update_ledger" => Ok(ActionKind::UpdateLedger),
            // Unknown,
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl ActionContext {
    /// Assemble the context handed to the dispatcher for one action of
    /// the given transition.  The token is derived from the version
    /// the transition is based on, so a retry of the same attempt
    /// produces the same token.
    pub fn new(
        instance: &WorkflowInstance,
        transition: &Transition,
        actor_id: i64,
        action: &ActionRef,
    ) -> Self {
        Self {
            instance_id: instance.id,
            kind: instance.kind,
            org_id: instance.org_id,
            subject: instance.subject.clone(),
            transition: transition.name.to_string(),
            from_state: instance.state.clone(),
            to_state: transition.target.to_string(),
            actor_id,
            dedup_token: format!(
                "{}/{}/{}",
                instance.id,
                instance.version,
                action.name,
            ),
        }
    }
}

impl ActionResult {
    pub fn ok(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            success: true,
            retryable: false,
            message: None,
            payload: None,
        }
    }

    pub fn failed(
        action: impl Into<String>,
        retryable: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            success: false,
            retryable,
            message: Some(message.into()),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use crate::flow::{
        DefinitionRegistry,
        WorkflowInstance,
        WorkflowKind,
    };
    use super::{
        ActionContext,
        ActionKind,
        ActionResult,
    };

    #[test]
    fn smoke() -> anyhow::Result<()> {
        assert_eq!(ActionKind::SendEmail.to_string(), "send_email");
        assert_eq!(ActionKind::SendEmail, ActionKind::from_str("send_email")?);
        assert_eq!(
            ActionKind::from_str("telegraph").unwrap_or_default(),
            ActionKind::Unknown,
        );
        Ok(())
    }

    #[test]
    fn context_token() -> anyhow::Result<()> {
        let registry = DefinitionRegistry::builtin()?;
        let definition = registry.get(WorkflowKind::BuyerSalePipeline)
            .expect("definition present");
        let transition = definition.transition("PROSPECT", "reserve")
            .expect("transition present");
        let instance = WorkflowInstance {
            id: 7,
            kind: WorkflowKind::BuyerSalePipeline,
            org_id: 10,
            project_id: Some(3),
            subject: "buyer/21".to_string(),
            state: "PROSPECT".to_string(),
            version: 4,
            metadata: serde_json::json!({}),
            created_ts: 1234567890,
            updated_ts: 1234567890,
        };

        let ctx = ActionContext::new(
            &instance,
            transition,
            99,
            &transition.actions[0],
        );
        assert_eq!(ctx.dedup_token, "7/4/notify_buyer_reserved");
        assert_eq!(ctx.from_state, "PROSPECT");
        assert_eq!(ctx.to_state, "RESERVED");
        Ok(())
    }

    #[test]
    fn result_builders() {
        let result = ActionResult::ok("notify_buyer_reserved")
            .with_payload(serde_json::json!({"notification_id": 5}));
        assert!(result.success);
        assert!(!result.retryable);

        let result = ActionResult::failed("email_invoice", true, "smtp timeout");
        assert!(!result.success);
        assert!(result.retryable);
        assert_eq!(result.message.as_deref(), Some("smtp timeout"));
    }
}
