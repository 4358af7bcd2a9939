use enumset::EnumSet;
use std::{
    fmt,
    ops::{
        Deref,
        DerefMut,
    },
    str::FromStr,
};
use crate::ac::permission::{
    Permission,
    Permissions,
};
use crate::error::ValueError;
use super::{
    Role,
    Roles,
};

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

impl From<Role> for &'static str {
    fn from(role: Role) -> &'static str {
        match role {
            Role::Undefined => "undefined",
            Role::SaasAdmin => "saas_admin",
            Role::OrgAdmin => "org_admin",
            Role::Promoter => "promoter",
            Role::GeneralContractor => "general_contractor",
            Role::Architect => "architect",
            Role::Engineer => "engineer",
            Role::Notary => "notary",
            Role::Broker => "broker",
            Role::Buyer => "buyer",
            Role::Supplier => "supplier",
        }
    }
}

impl FromStr for Role {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saas_admin" => Ok(Role::SaasAdmin),
            "org_admin" => Ok(Role::OrgAdmin),
            "promoter" => Ok(Role::Promoter),
            "general_contractor" => Ok(Role::GeneralContractor),
            "architect" => Ok(Role::Architect),
            "engineer" => Ok(Role::Engineer),
            "notary" => Ok(Role::Notary),
            "broker" => Ok(Role::Broker),
            "buyer" => Ok(Role::Buyer),
            "supplier" => Ok(Role::Supplier),
            // Undefined,
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl Role {
    /// The permissions granted to this role across the organization.
    ///
    /// This is the lookup the transition guard consults; roles carry
    /// their permissions as plain data rather than going through a
    /// policy engine.
    pub fn permits(self) -> Permissions {
        match self {
            Role::SaasAdmin |
            Role::OrgAdmin => EnumSet::all(),
            Role::Promoter =>
                Permission::ProjectsManage |
                Permission::SalesManage |
                Permission::FinanceRecordPayment |
                Permission::TicketsManage |
                Permission::MaterialsManage,
            Role::GeneralContractor =>
                Permission::TicketsManage |
                Permission::MaterialsManage,
            Role::Architect |
            Role::Engineer |
            Role::Supplier => EnumSet::only(Permission::MaterialsManage),
            Role::Notary => EnumSet::only(Permission::DocumentsValidate),
            Role::Broker => EnumSet::only(Permission::SalesManage),
            Role::Buyer |
            Role::Undefined => EnumSet::empty(),
        }
    }
}

impl From<Role> for Roles {
    fn from(role: Role) -> Self {
        Self(EnumSet::only(role))
    }
}

impl From<EnumSet<Role>> for Roles {
    fn from(roles: EnumSet<Role>) -> Self {
        Self(roles)
    }
}

impl<const N: usize> From<[Role; N]> for Roles {
    fn from(roles: [Role; N]) -> Self {
        Self(roles.into_iter().collect())
    }
}

impl FromIterator<Role> for Roles {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Deref for Roles {
    type Target = EnumSet<Role>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Roles {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(feature = "clap")]
mod clap {
    use ::clap::{
        ValueEnum,
        builder::PossibleValue,
    };
    use super::*;

    impl ValueEnum for Role {
        fn value_variants<'a>() -> &'a [Self] {
            &[
                Role::SaasAdmin,
                Role::OrgAdmin,
                Role::Promoter,
                Role::GeneralContractor,
                Role::Architect,
                Role::Engineer,
                Role::Notary,
                Role::Broker,
                Role::Buyer,
                Role::Supplier,
            ]
        }

        fn to_possible_value(&self) -> Option<PossibleValue> {
            match self {
                Role::Undefined => None,
                role => Some(PossibleValue::new(<&'static str>::from(*role))),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::{
        Role,
        Roles,
    };
    use crate::ac::permission::Permission;
    use crate::error::ValueError;

    #[test]
    fn smoke() -> anyhow::Result<()> {
        // sample of standard conversions
        assert_eq!(Role::Promoter.to_string(), "promoter");
        assert_eq!(Role::Promoter, Role::from_str("promoter")?);
        assert_eq!(Role::Notary.to_string(), "notary");
        assert_eq!(Role::Notary, Role::from_str("notary")?);

        // error conversion
        assert!(Role::from_str("undefined").is_err());
        assert!(matches!(
            Role::from_str("no_such_role")
                .expect_err("should be an error"),
            ValueError::Unsupported(s) if s == "no_such_role".to_string(),
        ));

        // infallable conversion
        assert_eq!(
            Role::from_str("no_such_role")
                .unwrap_or_default(),
            Role::Undefined,
        );
        Ok(())
    }

    #[test]
    fn grants() {
        assert!(Role::OrgAdmin.permits().contains(Permission::FinanceApprovePayment));
        assert!(Role::Promoter.permits().contains(Permission::SalesManage));
        assert!(!Role::Promoter.permits().contains(Permission::FinanceApprovePayment));
        assert!(Role::Notary.permits().contains(Permission::DocumentsValidate));
        assert!(Role::Buyer.permits().is_empty());
    }

    #[test]
    fn sets() {
        let roles = Roles::from([Role::Promoter, Role::OrgAdmin]);
        assert!(roles.contains(Role::Promoter));
        assert!(!roles.contains(Role::Notary));
        assert_eq!(roles, [Role::OrgAdmin, Role::Promoter].into_iter().collect());
    }
}
