//! Seed data shared by the integration tests.

use chrono::{DateTime, TimeZone, Utc};
use pantry_admin::models::{MasterList, Owner, StockItem, SubmittedItem, SubmittedList};
use pantry_core::{
    AreaId, CatalogItemId, ItemRef, ListKind, MasterListId, Quantity, StockItemId, SubmissionId,
    SubmissionStatus, SubmittedItemId, Unit, UserId,
};

/// Parse a quantity literal, panicking on bad input.
///
/// # Panics
///
/// Panics if `raw` is not a valid quantity.
#[must_use]
#[allow(clippy::expect_used)]
pub fn q(raw: &str) -> Quantity {
    Quantity::parse(raw).expect("valid quantity literal")
}

/// Stock item in kilograms.
#[must_use]
pub fn stock(id: i64, name: &str, current: &str, threshold: &str, lot: &str) -> StockItem {
    StockItem {
        id: StockItemId::new(id),
        name: name.to_string(),
        unit: Unit::Kilogram,
        current_quantity: q(current),
        minimum_threshold: q(threshold),
        reorder_lot_size: q(lot),
        uses_threshold: true,
    }
}

/// Master list in area 1.
#[must_use]
pub fn master_list(id: i64, name: &str, items: Vec<StockItem>) -> MasterList {
    MasterList {
        id: MasterListId::new(id),
        name: name.to_string(),
        area_id: Some(AreaId::new(1)),
        items,
    }
}

/// Catalog item asking for one kilogram.
#[must_use]
pub fn submitted_item(id: i64, name: &str) -> SubmittedItem {
    SubmittedItem {
        id: SubmittedItemId::new(id),
        item_ref: ItemRef::Catalog {
            id: CatalogItemId::new(id),
        },
        item_name: name.to_string(),
        unit: Unit::Kilogram,
        requested_quantity: Some(Quantity::ONE),
        priority: None,
        observation: None,
        discarded: false,
        suggested_for_catalog: false,
        supplier: None,
        order_status: None,
    }
}

/// March 2026, at the given day and hour (UTC).
#[must_use]
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Submitted list owned by Ana, with the given items.
#[must_use]
pub fn submission(
    id: i64,
    kind: ListKind,
    status: SubmissionStatus,
    items: Vec<SubmittedItem>,
) -> SubmittedList {
    let created_at = at(2, 10);
    SubmittedList {
        id: SubmissionId::new(id),
        kind,
        name: format!("Cozinha {id}"),
        owner: Owner {
            id: UserId::new(7),
            name: "Ana".to_string(),
        },
        created_at,
        submitted_at: (status != SubmissionStatus::Rascunho).then_some(created_at),
        status,
        archived: false,
        admin_message: None,
        items,
    }
}
