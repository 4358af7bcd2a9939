#[cfg(feature = "chrono")]
pub mod chrono;
pub mod core;
#[cfg(feature = "flow")]
pub mod flow;

mod utils;
pub use utils::*;
