use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

#[non_exhaustive]
#[derive(Debug, Default, EnumSetType, Hash, Deserialize, Serialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    // catch-all for whenever infallable conversion is needed
    #[default]
    Undefined,
    SaasAdmin,
    OrgAdmin,
    Promoter,
    GeneralContractor,
    Architect,
    Engineer,
    Notary,
    Broker,
    Buyer,
    Supplier,
}

/// The set of roles held by an actor, or naming the roles that a
/// transition accepts.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Roles(pub EnumSet<Role>);

mod impls;
