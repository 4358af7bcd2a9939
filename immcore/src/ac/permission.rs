use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

/// A named `resource.action` pair that a transition may require.
#[derive(Debug, EnumSetType, Hash, Deserialize, Serialize)]
#[enumset(serialize_repr = "list")]
pub enum Permission {
    #[serde(rename = "projects.manage")]
    ProjectsManage,
    #[serde(rename = "sales.manage")]
    SalesManage,
    #[serde(rename = "documents.validate")]
    DocumentsValidate,
    #[serde(rename = "finance.record_payment")]
    FinanceRecordPayment,
    #[serde(rename = "finance.approve_payment")]
    FinanceApprovePayment,
    #[serde(rename = "tickets.manage")]
    TicketsManage,
    #[serde(rename = "materials.manage")]
    MaterialsManage,
}

pub type Permissions = EnumSet<Permission>;

mod impls;
