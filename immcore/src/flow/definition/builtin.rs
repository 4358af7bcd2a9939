use crate::ac::{
    permission::{
        Permission,
        Permissions,
    },
    role::{
        Role,
        Roles,
    },
};
use crate::dispatch::{
    ActionKind,
    ActionRef,
};
use crate::flow::WorkflowKind;
use super::{
    DisplayHint,
    Precondition,
    StateInfo,
    Transition,
    WorkflowDefinition,
};

pub(super) fn buyer_sale_pipeline() -> WorkflowDefinition {
    WorkflowDefinition {
        kind: WorkflowKind::BuyerSalePipeline,
        states: vec![
            StateInfo {
                name: "PROSPECT",
                label: "Prospect",
                hint: DisplayHint::Neutral,
            },
            StateInfo {
                name: "RESERVED",
                label: "Réservé",
                hint: DisplayHint::Info,
            },
            StateInfo {
                name: "CONTRACT_PENDING",
                label: "Contrat en attente",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "CONTRACT_SIGNED",
                label: "Contrat signé",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "NOTARY_PENDING",
                label: "Chez notaire",
                hint: DisplayHint::Warning,
            },
            StateInfo {
                name: "SALE_COMPLETED",
                label: "Acte signé",
                hint: DisplayHint::Success,
            },
            StateInfo {
                name: "DELIVERED",
                label: "Finalisé",
                hint: DisplayHint::Success,
            },
        ],
        initial: "PROSPECT",
        terminal: &["DELIVERED"],
        transitions: vec![
            Transition {
                name: "reserve",
                from: "PROSPECT",
                target: "RESERVED",
                description: "Reserve a lot for this buyer".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_buyer_reserved",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "prepare_contract",
                from: "RESERVED",
                target: "CONTRACT_PENDING",
                description: "Issue the sale contract for signature".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "sign_contract",
                from: "CONTRACT_PENDING",
                target: "CONTRACT_SIGNED",
                description: "Record the signed sale contract".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::ArchiveDocument,
                        name: "archive_signed_contract",
                    },
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_buyer_contract_signed",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "send_to_notary",
                from: "CONTRACT_SIGNED",
                target: "NOTARY_PENDING",
                description: "Forward the dossier to the notary".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_notary_dossier",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "complete_sale",
                from: "NOTARY_PENDING",
                target: "SALE_COMPLETED",
                description: "Record completion of the notarial sale".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::UpdateLedger,
                        name: "update_sale_ledger",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "deliver",
                from: "SALE_COMPLETED",
                target: "DELIVERED",
                description: "Hand the lot over to the buyer".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_buyer_delivery",
                    },
                ],
                precondition: None,
            },
        ],
    }
}

pub(super) fn notary_dossier() -> WorkflowDefinition {
    WorkflowDefinition {
        kind: WorkflowKind::NotaryDossier,
        states: vec![
            StateInfo {
                name: "incomplete",
                label: "Dossier incomplet",
                hint: DisplayHint::Warning,
            },
            StateInfo {
                name: "waiting_notary",
                label: "En attente notaire",
                hint: DisplayHint::Info,
            },
            StateInfo {
                name: "act_v1",
                label: "Projet acte V1",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "act_v2",
                label: "Projet acte V2",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "final",
                label: "Acte finalisé",
                hint: DisplayHint::Success,
            },
            StateInfo {
                name: "signed",
                label: "Acte signé",
                hint: DisplayHint::Success,
            },
        ],
        initial: "incomplete",
        terminal: &["signed"],
        transitions: vec![
            Transition {
                name: "submit_to_notary",
                from: "incomplete",
                target: "waiting_notary",
                description: "Send the completed dossier to the notary".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::SendEmail,
                        name: "email_dossier_to_notary",
                    },
                ],
                precondition: Some(Precondition::SubjectReady),
            },
            Transition {
                name: "draft_act",
                from: "waiting_notary",
                target: "act_v1",
                description: "Produce the first draft of the deed".to_string(),
                roles: Roles::from([
                    Role::Notary,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "revise_act",
                from: "act_v1",
                target: "act_v2",
                description: "Issue a revised draft of the deed".to_string(),
                roles: Roles::from([
                    Role::Notary,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "request_changes",
                from: "act_v2",
                target: "act_v1",
                description: "Return the draft for another revision".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::Notary,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "finalize_act",
                from: "act_v2",
                target: "final",
                description: "Lock the deed for signature".to_string(),
                roles: Roles::from([
                    Role::Notary,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "sign_act",
                from: "final",
                target: "signed",
                description: "Record the signing appointment outcome".to_string(),
                roles: Roles::from([
                    Role::Notary,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::ArchiveDocument,
                        name: "archive_signed_act",
                    },
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_parties_act_signed",
                    },
                ],
                precondition: None,
            },
        ],
    }
}

pub(super) fn avenant() -> WorkflowDefinition {
    WorkflowDefinition {
        kind: WorkflowKind::Avenant,
        states: vec![
            StateInfo {
                name: "draft",
                label: "Brouillon",
                hint: DisplayHint::Neutral,
            },
            StateInfo {
                name: "sent",
                label: "En attente de signature",
                hint: DisplayHint::Info,
            },
            StateInfo {
                name: "accepted",
                label: "Signe",
                hint: DisplayHint::Success,
            },
            StateInfo {
                name: "rejected",
                label: "Refuse",
                hint: DisplayHint::Danger,
            },
            StateInfo {
                name: "cancelled",
                label: "Annule",
                hint: DisplayHint::Neutral,
            },
        ],
        initial: "draft",
        terminal: &["accepted", "rejected", "cancelled"],
        transitions: vec![
            Transition {
                name: "send",
                from: "draft",
                target: "sent",
                description: "Send the amendment out for signature".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::SendEmail,
                        name: "email_avenant_for_signature",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "approve",
                from: "sent",
                target: "accepted",
                description: "Record acceptance of the amendment".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_avenant_accepted",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "reject",
                from: "sent",
                target: "rejected",
                description: "Record refusal of the amendment".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "cancel",
                from: "draft",
                target: "cancelled",
                description: "Withdraw the amendment before sending".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "cancel",
                from: "sent",
                target: "cancelled",
                description: "Withdraw the amendment awaiting signature".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
        ],
    }
}

pub(super) fn sav_ticket() -> WorkflowDefinition {
    WorkflowDefinition {
        kind: WorkflowKind::SavTicket,
        states: vec![
            StateInfo {
                name: "open",
                label: "Nouveau",
                hint: DisplayHint::Warning,
            },
            StateInfo {
                name: "in_progress",
                label: "En cours",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "resolved",
                label: "Repare",
                hint: DisplayHint::Success,
            },
            StateInfo {
                name: "archived",
                label: "Cloture",
                hint: DisplayHint::Neutral,
            },
        ],
        initial: "open",
        terminal: &["archived"],
        transitions: vec![
            Transition {
                name: "start",
                from: "open",
                target: "in_progress",
                description: "Start work on the reported defect".to_string(),
                roles: Roles::from([
                    Role::GeneralContractor,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::CreateTask,
                        name: "create_intervention_task",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "resolve",
                from: "in_progress",
                target: "resolved",
                description: "Mark the reported defect as repaired".to_string(),
                roles: Roles::from([
                    Role::GeneralContractor,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_buyer_ticket_resolved",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "reopen",
                from: "resolved",
                target: "open",
                description: "Reopen the ticket, the repair was not accepted".to_string(),
                roles: Roles::from([
                    Role::Buyer,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "archive",
                from: "resolved",
                target: "archived",
                description: "Close out the accepted repair".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
        ],
    }
}

pub(super) fn invoice() -> WorkflowDefinition {
    WorkflowDefinition {
        kind: WorkflowKind::Invoice,
        states: vec![
            StateInfo {
                name: "draft",
                label: "Brouillon",
                hint: DisplayHint::Neutral,
            },
            StateInfo {
                name: "pending",
                label: "En attente",
                hint: DisplayHint::Info,
            },
            StateInfo {
                name: "partial",
                label: "Partiel",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "paid",
                label: "Payé",
                hint: DisplayHint::Success,
            },
            StateInfo {
                name: "late",
                label: "En retard",
                hint: DisplayHint::Danger,
            },
            StateInfo {
                name: "cancelled",
                label: "Annulé",
                hint: DisplayHint::Neutral,
            },
        ],
        initial: "draft",
        terminal: &["paid", "cancelled"],
        transitions: vec![
            Transition {
                name: "issue",
                from: "draft",
                target: "pending",
                description: "Issue the invoice to the buyer".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::SendEmail,
                        name: "email_invoice",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "record_payment",
                from: "pending",
                target: "partial",
                description: "Record a partial payment".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            // settlement counts as approving the payment in full, so
            // this deliberately has no role list and goes through the
            // permission path only.
            Transition {
                name: "settle",
                from: "pending",
                target: "paid",
                description: "Record payment in full".to_string(),
                roles: Roles::default(),
                permits: Permissions::only(Permission::FinanceApprovePayment),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::UpdateLedger,
                        name: "update_payment_ledger",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "settle",
                from: "partial",
                target: "paid",
                description: "Record payment in full".to_string(),
                roles: Roles::default(),
                permits: Permissions::only(Permission::FinanceApprovePayment),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::UpdateLedger,
                        name: "update_payment_ledger",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "settle",
                from: "late",
                target: "paid",
                description: "Record payment in full after the due date".to_string(),
                roles: Roles::default(),
                permits: Permissions::only(Permission::FinanceApprovePayment),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::UpdateLedger,
                        name: "update_payment_ledger",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "mark_late",
                from: "pending",
                target: "late",
                description: "Flag the invoice as past its due date".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_buyer_invoice_late",
                    },
                ],
                precondition: Some(Precondition::PastDue),
            },
            Transition {
                name: "mark_late",
                from: "partial",
                target: "late",
                description: "Flag the invoice as past its due date".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::Notify,
                        name: "notify_buyer_invoice_late",
                    },
                ],
                precondition: Some(Precondition::PastDue),
            },
            Transition {
                name: "cancel",
                from: "draft",
                target: "cancelled",
                description: "Void the invoice before issuing".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "cancel",
                from: "pending",
                target: "cancelled",
                description: "Void the issued invoice".to_string(),
                roles: Roles::from([
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
        ],
    }
}

pub(super) fn material_choice() -> WorkflowDefinition {
    WorkflowDefinition {
        kind: WorkflowKind::MaterialChoice,
        states: vec![
            StateInfo {
                name: "pending",
                label: "En attente",
                hint: DisplayHint::Neutral,
            },
            StateInfo {
                name: "confirmed",
                label: "Confirmé",
                hint: DisplayHint::Info,
            },
            StateInfo {
                name: "approved",
                label: "Approuvé",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "ordered",
                label: "Commandé",
                hint: DisplayHint::Progress,
            },
            StateInfo {
                name: "installed",
                label: "Installé",
                hint: DisplayHint::Success,
            },
            StateInfo {
                name: "declined",
                label: "Refusé",
                hint: DisplayHint::Danger,
            },
        ],
        initial: "pending",
        terminal: &["installed", "declined"],
        transitions: vec![
            Transition {
                name: "confirm",
                from: "pending",
                target: "confirmed",
                description: "Buyer locks in this material choice".to_string(),
                roles: Roles::from([
                    Role::Buyer,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "decline",
                from: "pending",
                target: "declined",
                description: "Buyer declines the proposed option".to_string(),
                roles: Roles::from([
                    Role::Buyer,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "approve",
                from: "confirmed",
                target: "approved",
                description: "Validate feasibility of the confirmed choice".to_string(),
                roles: Roles::default(),
                permits: Permissions::only(Permission::MaterialsManage),
                actions: vec![],
                precondition: None,
            },
            Transition {
                name: "order",
                from: "approved",
                target: "ordered",
                description: "Place the supplier order".to_string(),
                roles: Roles::from([
                    Role::Supplier,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![
                    ActionRef {
                        kind: ActionKind::CreateTask,
                        name: "create_supplier_order_task",
                    },
                ],
                precondition: None,
            },
            Transition {
                name: "install",
                from: "ordered",
                target: "installed",
                description: "Confirm installation on site".to_string(),
                roles: Roles::from([
                    Role::GeneralContractor,
                    Role::Promoter,
                    Role::OrgAdmin,
                    Role::SaasAdmin,
                ]),
                permits: Permissions::empty(),
                actions: vec![],
                precondition: None,
            },
        ],
    }
}
