pub mod ac;
pub mod checklist;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod platform;
