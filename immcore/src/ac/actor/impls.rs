use crate::ac::{
    permission::Permissions,
    role::{
        Role,
        Roles,
    },
};
use super::Actor;

impl Actor {
    pub fn new(id: i64, org_id: i64, roles: impl Into<Roles>) -> Self {
        Self {
            id,
            org_id,
            roles: roles.into(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    /// The union of the permissions granted to every role held.
    pub fn permits(&self) -> Permissions {
        self.roles
            .iter()
            .map(Role::permits)
            .fold(Permissions::empty(), |acc, permits| acc | permits)
    }
}

#[cfg(test)]
mod test {
    use crate::ac::{
        Actor,
        Permission,
        Role,
    };

    #[test]
    fn permits_union() {
        let actor = Actor::new(1, 10, [Role::Notary, Role::Broker]);
        assert!(actor.has_role(Role::Notary));
        assert!(!actor.has_role(Role::Promoter));

        let permits = actor.permits();
        assert!(permits.contains(Permission::DocumentsValidate));
        assert!(permits.contains(Permission::SalesManage));
        assert!(!permits.contains(Permission::FinanceApprovePayment));
    }

    #[test]
    fn permits_empty() {
        let actor = Actor::new(2, 10, [Role::Buyer]);
        assert!(actor.permits().is_empty());
    }
}
