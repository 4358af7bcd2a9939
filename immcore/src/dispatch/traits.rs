use async_trait::async_trait;
use crate::error::BackendError;
use super::{
    ActionContext,
    ActionRef,
    ActionResult,
};

/// Runs the side effects attached to transitions.
///
/// Implementations decide what each action name means; the engine only
/// sequences them and records their results.  Returning `Err` is
/// treated as a transport failure, which the engine folds into a
/// retryable `ActionResult` rather than aborting outright.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn execute(
        &self,
        action: &ActionRef,
        ctx: &ActionContext,
    ) -> Result<ActionResult, BackendError>;
}
