use std::{
    fmt,
    str::FromStr,
};
use crate::error::ValueError;
use super::{
    ChecklistItem,
    ItemStatus,
    ReadinessResult,
};

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

impl From<ItemStatus> for &'static str {
    fn from(status: ItemStatus) -> &'static str {
        match status {
            ItemStatus::Ok => "OK",
            ItemStatus::Missing => "MISSING",
            ItemStatus::Warning => "WARNING",
            ItemStatus::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_ref() {
            "OK" => Ok(ItemStatus::Ok),
            "MISSING" => Ok(ItemStatus::Missing),
            "WARNING" => Ok(ItemStatus::Warning),
            // Unknown,
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl ChecklistItem {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        status: ItemStatus,
        detail: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            status,
            detail,
        }
    }
}

fn blocks(status: ItemStatus) -> bool {
    !matches!(status, ItemStatus::Ok | ItemStatus::Warning)
}

impl ReadinessResult {
    /// Aggregate the items.  `Warning` items are surfaced but do not
    /// hold the subject back; anything else short of `Ok` does.
    pub fn new(subject: impl Into<String>, items: Vec<ChecklistItem>) -> Self {
        let ready = items
            .iter()
            .all(|item| !blocks(item.status));
        Self {
            subject: subject.into(),
            items,
            ready,
        }
    }

    /// The items that hold the subject back from being ready.
    pub fn failing(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.items
            .iter()
            .filter(|item| blocks(item.status))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::{
        ChecklistItem,
        ItemStatus,
        ReadinessResult,
    };

    #[test]
    fn smoke() -> anyhow::Result<()> {
        assert_eq!(ItemStatus::Missing.to_string(), "MISSING");
        assert_eq!(ItemStatus::Missing, ItemStatus::from_str("MISSING")?);
        assert!(ItemStatus::from_str("UNKNOWN").is_err());
        assert_eq!(
            ItemStatus::from_str("nope").unwrap_or_default(),
            ItemStatus::Unknown,
        );
        Ok(())
    }

    #[test]
    fn all_ok_means_ready() {
        let result = ReadinessResult::new("lot/1", vec![
            ChecklistItem::new("DOCS_REQUIRED", "Documents", ItemStatus::Ok, None),
            ChecklistItem::new("MANDATORY_INVOICES", "Acomptes", ItemStatus::Ok, None),
        ]);
        assert!(result.ready);
        assert_eq!(result.failing().count(), 0);
    }

    #[test]
    fn warning_surfaces_without_blocking() {
        let result = ReadinessResult::new("lot/1", vec![
            ChecklistItem::new("DOCS_REQUIRED", "Documents", ItemStatus::Ok, None),
            ChecklistItem::new(
                "MATERIAL_CHOICES",
                "Choix matériaux",
                ItemStatus::Warning,
                Some("2 choix non confirmés".to_string()),
            ),
        ]);
        assert!(result.ready);
        assert_eq!(result.failing().count(), 0);
    }

    #[test]
    fn missing_blocks_readiness() {
        let result = ReadinessResult::new("lot/1", vec![
            ChecklistItem::new(
                "DOCS_REQUIRED",
                "Documents",
                ItemStatus::Missing,
                Some("ID_DOC".to_string()),
            ),
            ChecklistItem::new(
                "MATERIAL_CHOICES",
                "Choix matériaux",
                ItemStatus::Warning,
                None,
            ),
            ChecklistItem::new("MANDATORY_INVOICES", "Acomptes", ItemStatus::Ok, None),
        ]);
        assert!(!result.ready);
        assert_eq!(
            result.failing().map(|item| item.key.as_str()).collect::<Vec<_>>(),
            ["DOCS_REQUIRED"],
        );
    }

    #[test]
    fn empty_checklist_is_ready() {
        assert!(ReadinessResult::new("lot/1", vec![]).ready);
    }
}
