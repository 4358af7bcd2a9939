use std::{
    fmt,
    ops::{
        Deref,
        DerefMut,
    },
    str::FromStr,
};
use crate::error::ValueError;
use crate::flow::*;

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

impl From<WorkflowKind> for String {
    fn from(kind: WorkflowKind) -> String {
        format!("{kind}")
    }
}

impl From<WorkflowKind> for &'static str {
    fn from(kind: WorkflowKind) -> &'static str {
        match kind {
            WorkflowKind::BuyerSalePipeline => "BUYER_SALE_PIPELINE",
            WorkflowKind::NotaryDossier => "NOTARY_DOSSIER",
            WorkflowKind::Avenant => "AVENANT",
            WorkflowKind::SavTicket => "SAV_TICKET",
            WorkflowKind::Invoice => "INVOICE",
            WorkflowKind::MaterialChoice => "MATERIAL_CHOICE",
            WorkflowKind::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for WorkflowKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_ref() {
            "BUYER_SALE_PIPELINE" => Ok(WorkflowKind::BuyerSalePipeline),
            "NOTARY_DOSSIER" => Ok(WorkflowKind::NotaryDossier),
            "AVENANT" => Ok(WorkflowKind::Avenant),
            "SAV_TICKET" => Ok(WorkflowKind::SavTicket),
            "INVOICE" => Ok(WorkflowKind::Invoice),
            "MATERIAL_CHOICE" => Ok(WorkflowKind::MaterialChoice),
            // Unknown,
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl From<Vec<WorkflowInstance>> for WorkflowInstances {
    fn from(args: Vec<WorkflowInstance>) -> Self {
        Self(args)
    }
}

impl<const N: usize> From<[WorkflowInstance; N]> for WorkflowInstances {
    fn from(args: [WorkflowInstance; N]) -> Self {
        Self(args.into())
    }
}

impl Deref for WorkflowInstances {
    type Target = Vec<WorkflowInstance>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for WorkflowInstances {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for WorkflowInstances {
    type Item = WorkflowInstance;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<TransitionRecord>> for TransitionRecords {
    fn from(args: Vec<TransitionRecord>) -> Self {
        Self(args)
    }
}

impl<const N: usize> From<[TransitionRecord; N]> for TransitionRecords {
    fn from(args: [TransitionRecord; N]) -> Self {
        Self(args.into())
    }
}

impl Deref for TransitionRecords {
    type Target = Vec<TransitionRecord>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TransitionRecords {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for TransitionRecords {
    type Item = TransitionRecord;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl InstanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: WorkflowKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn org_id(mut self, org_id: i64) -> Self {
        self.org_id = Some(org_id);
        self
    }

    pub fn project_id(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

#[cfg(feature = "clap")]
mod clap {
    use ::clap::{
        ValueEnum,
        builder::PossibleValue,
    };
    use super::*;

    impl ValueEnum for WorkflowKind {
        fn value_variants<'a>() -> &'a [Self] {
            &[
                WorkflowKind::BuyerSalePipeline,
                WorkflowKind::NotaryDossier,
                WorkflowKind::Avenant,
                WorkflowKind::SavTicket,
                WorkflowKind::Invoice,
                WorkflowKind::MaterialChoice,
            ]
        }

        fn to_possible_value(&self) -> Option<PossibleValue> {
            match self {
                WorkflowKind::Unknown => None,
                kind => Some(PossibleValue::new(<&'static str>::from(*kind))),
            }
        }
    }
}
