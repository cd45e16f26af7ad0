//! Purchase-order lines ("pedidos") produced by supplier assignment.

use chrono::{DateTime, Utc};
use pantry_core::{MasterListId, OrderStatus, PurchaseOrderId, Quantity, StockItemId, SupplierId, UserId};
use serde::{Deserialize, Serialize};

/// A purchase-order line.
///
/// Lines are never deleted, only re-statused. The quantity can be edited
/// while the line is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    /// Unique order ID.
    pub id: PurchaseOrderId,
    /// Master list the item belongs to.
    pub master_list_id: MasterListId,
    /// Ordered stock item.
    pub item_id: StockItemId,
    /// Item name at the time the order was created.
    pub item_name: String,
    /// Supplier the order was assigned to.
    pub supplier_id: SupplierId,
    /// Quantity to buy.
    pub requested_quantity: Quantity,
    /// Review status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Administrator who created the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<UserId>,
    /// When the order was created.
    pub requested_at: DateTime<Utc>,
}

impl PurchaseOrderLine {
    /// Returns `true` while the line can still be edited or decided.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pendente)
    }
}

/// Body of an order-creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub item_id: StockItemId,
    pub supplier_id: SupplierId,
    pub requested_quantity: Quantity,
}

/// Body of an order-quantity edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuantityUpdate {
    pub requested_quantity: Quantity,
}

/// Body of an order-status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
