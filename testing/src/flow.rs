use async_trait::async_trait;
use immcore::{
    dispatch::{
        ActionContext,
        ActionRef,
        ActionResult,
        traits::ActionDispatcher,
    },
    error::BackendError,
    platform::PlatformConnector,
};
use immdb_sqlite::SqliteBackend;
use immflow::platform::{
    Builder,
    Platform,
};
use std::{
    collections::{
        HashMap,
        VecDeque,
    },
    sync::{
        Arc,
        Mutex,
    },
};

/// A builder preloaded with a migrated in-memory store, for tests that
/// wire their own collaborators before building.
pub async fn create_sqlite_builder() -> anyhow::Result<Builder> {
    Ok(Builder::new()
        .flow_platform(SqliteBackend::flow("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?))
}

pub async fn create_sqlite_platform(
    dispatcher: impl ActionDispatcher + 'static,
) -> anyhow::Result<Platform> {
    Ok(create_sqlite_builder()
        .await?
        .dispatcher(dispatcher)
        .build())
}

type Scripts = HashMap<String, VecDeque<Result<ActionResult, String>>>;

/// Dispatcher with outcomes scripted per action name.
///
/// Scripted outcomes are consumed in dispatch order; an action with no
/// remaining script succeeds.  Every dispatch is journaled so tests
/// can assert on ordering and dedup tokens.
#[derive(Clone, Default)]
pub struct ScriptedDispatcher {
    scripts: Arc<Mutex<Scripts>>,
    journal: Arc<Mutex<Vec<ActionContext>>>,
}

impl ScriptedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue this result for the next dispatch of the named action.
    pub fn script(&self, action: &str, result: ActionResult) {
        self.scripts.lock()
            .expect("scripts lock")
            .entry(action.to_string())
            .or_default()
            .push_back(Ok(result));
    }

    /// Queue a transport failure for the next dispatch of the named
    /// action.
    pub fn script_error(&self, action: &str, message: &str) {
        self.scripts.lock()
            .expect("scripts lock")
            .entry(action.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Every context handed over so far, in call order.
    pub fn calls(&self) -> Vec<ActionContext> {
        self.journal.lock()
            .expect("journal lock")
            .clone()
    }
}

#[async_trait]
impl ActionDispatcher for ScriptedDispatcher {
    async fn execute(
        &self,
        action: &ActionRef,
        ctx: &ActionContext,
    ) -> Result<ActionResult, BackendError> {
        self.journal.lock()
            .expect("journal lock")
            .push(ctx.clone());
        let scripted = self.scripts.lock()
            .expect("scripts lock")
            .get_mut(action.name)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(
                BackendError::AppInvariantViolation(message)
            ),
            None => Ok(ActionResult::ok(action.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use immcore::{
        dispatch::ActionKind,
        flow::WorkflowKind,
    };
    use super::*;

    #[async_std::test]
    async fn smoke_test_create_platform() -> anyhow::Result<()> {
        create_sqlite_platform(ScriptedDispatcher::new()).await?;
        Ok(())
    }

    #[async_std::test]
    async fn scripted_outcomes_consumed_in_order() -> anyhow::Result<()> {
        let dispatcher = ScriptedDispatcher::new();
        dispatcher.script(
            "notify_buyer_reserved",
            ActionResult::failed("notify_buyer_reserved", true, "smtp down"),
        );
        let action = ActionRef {
            kind: ActionKind::Notify,
            name: "notify_buyer_reserved",
        };
        let ctx = ActionContext {
            instance_id: 1,
            kind: WorkflowKind::BuyerSalePipeline,
            org_id: 1,
            subject: "lot/1".to_string(),
            transition: "reserve".to_string(),
            from_state: "PROSPECT".to_string(),
            to_state: "RESERVED".to_string(),
            actor_id: 9,
            dedup_token: "1/0/notify_buyer_reserved".to_string(),
        };

        let result = dispatcher.execute(&action, &ctx).await?;
        assert!(!result.success);
        // the script is spent; the rerun falls back to success
        let result = dispatcher.execute(&action, &ctx).await?;
        assert!(result.success);
        assert_eq!(dispatcher.calls().len(), 2);

        dispatcher.script_error("notify_buyer_reserved", "unreachable");
        assert!(dispatcher.execute(&action, &ctx).await.is_err());
        Ok(())
    }
}
