use serde::{Deserialize, Serialize};
use super::role::Roles;

/// The caller identity supplied with every engine operation.
///
/// The engine holds no session state; whoever fronts it (an HTTP
/// layer, the cli, a test) resolves authentication elsewhere and
/// passes the resulting actor in with each call.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Actor {
    pub id: i64,
    pub org_id: i64,
    pub roles: Roles,
}

mod impls;
