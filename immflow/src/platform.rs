use immcore::{
    checklist::traits::{
        DocumentStore,
        InvoiceStore,
    },
    dispatch::traits::ActionDispatcher,
    flow::DefinitionRegistry,
    platform::FlowPlatform,
};
use std::sync::Arc;

mod impls;

#[derive(Default)]
pub struct Builder {
    // platform
    flow_platform: Option<Box<dyn FlowPlatform>>,
    // runs the side effects attached to transitions
    dispatcher: Option<Arc<dyn ActionDispatcher>>,
    // collaborators the readiness probes consult; probes for absent
    // collaborators are simply not wired in
    document_store: Option<Arc<dyn DocumentStore>>,
    invoice_store: Option<Arc<dyn InvoiceStore>>,
    registry: Option<DefinitionRegistry>,
}

pub(crate) struct PlatformInner {
    flow_platform: Box<dyn FlowPlatform>,
    dispatcher: Arc<dyn ActionDispatcher>,
    document_store: Option<Arc<dyn DocumentStore>>,
    invoice_store: Option<Arc<dyn InvoiceStore>>,
    registry: DefinitionRegistry,
}

#[derive(Clone)]
pub struct Platform(Arc<PlatformInner>);

/// What `start_instance` does when the subject already has a live
/// instance of the requested kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OnDuplicate {
    ReuseExisting,
    Reject,
}
