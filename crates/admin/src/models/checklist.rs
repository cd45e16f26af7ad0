//! Checklists exported from approved lists.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pantry_core::{ChecklistId, OrderStatus, Quantity, SubmissionId, SubmittedItemId, Unit};
use serde::{Deserialize, Serialize};

use super::submission::SubmittedList;

/// A purchasing checklist. Independent of its source once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: ChecklistId,
    pub name: String,
    pub source_submission_id: SubmissionId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ChecklistItem>,
}

/// A checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub name: String,
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

/// What to carry over into the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Checklist name; defaults to one derived from the list name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Quantity overrides per item. Items without one keep their requested quantity.
    #[serde(default)]
    pub item_quantities: BTreeMap<SubmittedItemId, Quantity>,
    #[serde(default = "default_true")]
    pub include_supplier: bool,
    #[serde(default = "default_true")]
    pub include_observations: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            name: None,
            item_quantities: BTreeMap::new(),
            include_supplier: true,
            include_observations: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

impl ConvertOptions {
    /// Name the checklist will get for `list`.
    #[must_use]
    pub fn checklist_name(&self, list: &SubmittedList) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("Checklist - {}", list.name), str::to_string)
    }
}

/// Snapshot the lines of `list` that belong in a checklist.
///
/// Discarded lines and rejected traditional lines are left out.
#[must_use]
pub fn snapshot_items(list: &SubmittedList, options: &ConvertOptions) -> Vec<ChecklistItem> {
    list.active_items()
        .filter(|item| item.order_status != Some(OrderStatus::Rejeitado))
        .map(|item| ChecklistItem {
            name: item.item_name.clone(),
            unit: item.unit,
            quantity: options
                .item_quantities
                .get(&item.id)
                .copied()
                .or(item.requested_quantity),
            supplier: if options.include_supplier {
                item.supplier.clone()
            } else {
                None
            },
            observation: if options.include_observations {
                item.observation.clone()
            } else {
                None
            },
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::submission::tests::list;
    use pantry_core::{ListKind, SubmissionStatus};

    #[test]
    fn test_snapshot_skips_discarded_and_rejected() {
        let mut l = list(ListKind::Traditional, SubmissionStatus::ParcialmenteAprovado);
        l.items.push(crate::models::submission::tests::item(3, "Sal"));
        l.items[0].order_status = Some(OrderStatus::Aprovado);
        l.items[1].order_status = Some(OrderStatus::Rejeitado);
        l.items[2].discarded = true;

        let items = snapshot_items(&l, &ConvertOptions::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Arroz");
    }

    #[test]
    fn test_snapshot_applies_options() {
        let mut l = list(ListKind::Quick, SubmissionStatus::Aprovado);
        l.items[0].supplier = Some("Atacadão".to_string());
        l.items[0].observation = Some("tipo 1".to_string());

        let mut options = ConvertOptions {
            include_supplier: false,
            ..ConvertOptions::default()
        };
        options
            .item_quantities
            .insert(SubmittedItemId::new(1), Quantity::from_units(4));

        let items = snapshot_items(&l, &options);
        assert_eq!(items[0].quantity, Some(Quantity::from_units(4)));
        assert_eq!(items[0].supplier, None);
        assert_eq!(items[0].observation.as_deref(), Some("tipo 1"));
        assert_eq!(items[1].quantity, Some(Quantity::ONE));
    }

    #[test]
    fn test_checklist_name() {
        let l = list(ListKind::Quick, SubmissionStatus::Aprovado);
        assert_eq!(
            ConvertOptions::default().checklist_name(&l),
            "Checklist - Cozinha"
        );
        let named = ConvertOptions {
            name: Some("  Feira  ".to_string()),
            ..ConvertOptions::default()
        };
        assert_eq!(named.checklist_name(&l), "Feira");
    }

    #[test]
    fn test_options_wire_format() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"itemQuantities":{"2":3.5},"includeSupplier":false}"#).unwrap();
        assert_eq!(
            options.item_quantities.get(&SubmittedItemId::new(2)),
            Some(&Quantity::parse("3.5").unwrap())
        );
        assert!(!options.include_supplier);
        assert!(options.include_observations);
    }
}
