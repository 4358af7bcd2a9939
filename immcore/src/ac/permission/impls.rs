use std::{
    fmt,
    str::FromStr,
};
use crate::error::ValueError;
use super::Permission;

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

impl From<Permission> for &'static str {
    fn from(permission: Permission) -> &'static str {
        match permission {
            Permission::ProjectsManage => "projects.manage",
            Permission::SalesManage => "sales.manage",
            Permission::DocumentsValidate => "documents.validate",
            Permission::FinanceRecordPayment => "finance.record_payment",
            Permission::FinanceApprovePayment => "finance.approve_payment",
            Permission::TicketsManage => "tickets.manage",
            Permission::MaterialsManage => "materials.manage",
        }
    }
}

impl FromStr for Permission {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "projects.manage" => Ok(Permission::ProjectsManage),
            "sales.manage" => Ok(Permission::SalesManage),
            "documents.validate" => Ok(Permission::DocumentsValidate),
            "finance.record_payment" => Ok(Permission::FinanceRecordPayment),
            "finance.approve_payment" => Ok(Permission::FinanceApprovePayment),
            "tickets.manage" => Ok(Permission::TicketsManage),
            "materials.manage" => Ok(Permission::MaterialsManage),
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::Permission;

    #[test]
    fn smoke() -> anyhow::Result<()> {
        assert_eq!(Permission::SalesManage.to_string(), "sales.manage");
        assert_eq!(
            Permission::SalesManage,
            Permission::from_str("sales.manage")?,
        );
        assert!(Permission::from_str("sales.explode").is_err());
        Ok(())
    }
}
