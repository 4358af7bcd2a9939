mod connector;
mod flow;
pub use connector::{ConnectorOption, PlatformConnector};
pub use flow::{DefaultFlowPlatform, FlowPlatform};

pub trait PlatformUrl {
    fn url(&self) -> &str;
}
