use crate::flow::traits::{
    HistoryBackend,
    InstanceBackend,
};
use super::PlatformUrl;

/// FlowPlatform - Workflow Persistence Platform
///
/// The store a workflow engine runs against: instances plus their
/// append-only transition history.
///
/// This trait is applicable to everything that correctly implements
/// the relevant backends that compose this trait.
pub trait FlowPlatform: InstanceBackend
    + HistoryBackend

    + PlatformUrl

    + Send
    + Sync
{
    fn as_dyn(&self) -> &dyn FlowPlatform;
}

pub trait DefaultFlowPlatform: FlowPlatform {}

impl<P: InstanceBackend
    + HistoryBackend

    + PlatformUrl

    + DefaultFlowPlatform

    + Send
    + Sync
> FlowPlatform for P {
    fn as_dyn(&self) -> &(dyn FlowPlatform) {
        self
    }
}
