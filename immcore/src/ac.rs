pub mod actor;
pub mod permission;
pub mod role;

pub use self::actor::Actor;
pub use self::permission::{Permission, Permissions};
pub use self::role::{Role, Roles};
