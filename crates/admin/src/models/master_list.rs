//! Master list ("lista mãe") domain models.

use pantry_core::{AreaId, MasterListId, Quantity, StockItemId, Unit, UnitKind};
use serde::{Deserialize, Deserializer, Serialize};

/// A stock item owned by a master list.
///
/// Thresholds and lot sizes arrive from hand-edited data, so they are read
/// leniently: missing or non-numeric values become `1`, negative values
/// become `0` (inactive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    /// Unique item ID.
    pub id: StockItemId,
    /// Display name.
    pub name: String,
    /// Unit of measure.
    pub unit: Unit,
    /// Last reported stock on hand.
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub current_quantity: Quantity,
    /// Reorder triggers at or below this level; `0` marks the item inactive.
    #[serde(default = "default_one", deserialize_with = "quantity_or_one")]
    pub minimum_threshold: Quantity,
    /// Fixed batch requested when the reorder triggers.
    #[serde(default = "default_one", deserialize_with = "quantity_or_one")]
    pub reorder_lot_size: Quantity,
    /// Whether collaborators see the threshold column for this item.
    #[serde(default)]
    pub uses_threshold: bool,
}

impl StockItem {
    /// Returns `true` unless the threshold is zero.
    ///
    /// Inactive items are hidden from default views and never reordered,
    /// but they are not deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.minimum_threshold.is_positive()
    }
}

/// A master list and the stock items it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterList {
    /// Unique list ID.
    pub id: MasterListId,
    /// Display name.
    pub name: String,
    /// Restaurant area the list belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
    /// Items owned by the list.
    #[serde(default)]
    pub items: Vec<StockItem>,
}

impl MasterList {
    /// Look up an item by ID.
    #[must_use]
    pub fn item(&self, id: StockItemId) -> Option<&StockItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Iterate over active items only.
    pub fn active_items(&self) -> impl Iterator<Item = &StockItem> {
        self.items.iter().filter(|item| item.is_active())
    }
}

/// Input for creating a new master list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMasterList {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
}

/// Partial update of a stock item (inline single-field edit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_threshold: Option<Quantity>,
}

impl ItemPatch {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit.is_none()
            && self.current_quantity.is_none()
            && self.minimum_threshold.is_none()
    }

    /// Apply the patch to an item in place.
    pub fn apply_to(&self, item: &mut StockItem) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if let Some(quantity) = self.current_quantity {
            item.current_quantity = quantity;
        }
        if let Some(threshold) = self.minimum_threshold {
            item.minimum_threshold = threshold;
        }
    }
}

/// Threshold configuration of a stock item (config dialog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub minimum_threshold: Quantity,
    pub reorder_lot_size: Quantity,
}

/// Whether a transfer keeps the source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// Body of a single-item transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub destination_list_id: MasterListId,
    pub mode: TransferMode,
}

/// Where copied or moved items go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An existing master list.
    Existing(MasterListId),
    /// A list created once, before any item is transferred.
    New {
        name: String,
        area_id: Option<AreaId>,
    },
}

/// AND-combined predicates for the item table.
///
/// Inactive items are always excluded, whatever the filter says.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Accent- and case-insensitive substring of the item name.
    pub name: Option<String>,
    pub unit: Option<Unit>,
    /// Mass, volume or count; matches every unit of that kind.
    pub unit_kind: Option<UnitKind>,
    /// Inclusive lower bound on the computed reorder quantity.
    pub min_reorder: Option<Quantity>,
    /// Inclusive upper bound on the computed reorder quantity.
    pub max_reorder: Option<Quantity>,
}

const fn default_one() -> Quantity {
    Quantity::ONE
}

fn quantity_or_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quantity, D::Error> {
    Ok(lenient_quantity(
        Option::<serde_json::Value>::deserialize(deserializer)?,
        Quantity::ONE,
    ))
}

fn quantity_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quantity, D::Error> {
    Ok(lenient_quantity(
        Option::<serde_json::Value>::deserialize(deserializer)?,
        Quantity::ZERO,
    ))
}

fn lenient_quantity(value: Option<serde_json::Value>, fallback: Quantity) -> Quantity {
    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s,
        _ => return fallback,
    };
    // Negative stored values clamp to zero
    Quantity::parse_or(&raw, fallback).unwrap_or(Quantity::ZERO)
}
