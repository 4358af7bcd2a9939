pub mod error;
pub mod guard;
pub mod platform;
pub mod readiness;

pub use platform::Platform;
