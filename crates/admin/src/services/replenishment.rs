//! Replenishment engine: reorder decisions for master lists.
//!
//! The reorder rule is a binary trigger on a fixed lot size: an active item
//! at or below its threshold asks for exactly one lot, anything else asks for
//! nothing. [`compute_reorder_quantity`] is the only place that decides this;
//! [`shortfall_label`] exists for display and is never used to create orders.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use pantry_core::text::{contains_folded, fold};
use pantry_core::{
    MasterListId, OrderStatus, PurchaseOrderId, Quantity, QuantityError, StockItemId, SupplierId,
    Unit,
};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::ServiceSettings;
use super::batch::{self, BatchFailure, BatchReport};
use crate::api::MasterListApi;
use crate::error::AppError;
use crate::models::{
    Destination, ItemFilter, ItemPatch, MasterList, NewMasterList, NewOrder, PurchaseOrderLine,
    StockItem, ThresholdConfig, TransferMode, TransferRequest,
};

/// Units to reorder for `item`, or `None` if the item is inactive.
///
/// Active items at or below their threshold get one lot; the rest get zero.
#[must_use]
pub fn compute_reorder_quantity(item: &StockItem) -> Option<Quantity> {
    if !item.is_active() {
        return None;
    }
    if item.current_quantity <= item.minimum_threshold {
        Some(item.reorder_lot_size)
    } else {
        Some(Quantity::ZERO)
    }
}

/// How far below its threshold an item is, formatted for list previews.
///
/// Display only. Orders always use [`compute_reorder_quantity`].
#[must_use]
pub fn shortfall_label(item: &StockItem) -> String {
    let shortfall = item.minimum_threshold.saturating_sub(item.current_quantity);
    format!("{shortfall} {}", item.unit)
}

/// Active items matching every predicate of `filter`.
#[must_use]
pub fn filter_active_items<'a>(items: &'a [StockItem], filter: &ItemFilter) -> Vec<&'a StockItem> {
    items
        .iter()
        .filter(|item| {
            let Some(reorder) = compute_reorder_quantity(item) else {
                return false;
            };
            filter
                .name
                .as_deref()
                .is_none_or(|name| contains_folded(&item.name, name))
                && filter.unit.is_none_or(|unit| unit == item.unit)
                && filter.unit_kind.is_none_or(|kind| kind == item.unit.kind())
                && filter.min_reorder.is_none_or(|min| reorder >= min)
                && filter.max_reorder.is_none_or(|max| reorder <= max)
        })
        .collect()
}

fn quantity_error(field: &str, err: &QuantityError) -> AppError {
    AppError::Validation(format!("{field}: {err}"))
}

/// Parse a threshold typed by a user. Non-numeric input becomes `1`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for negative values.
pub fn parse_threshold(raw: &str) -> Result<Quantity, AppError> {
    Quantity::parse_or(raw, Quantity::ONE).map_err(|e| quantity_error("minimumThreshold", &e))
}

/// Parse the config dialog's two fields. Non-numeric input becomes `1`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if either value is negative.
pub fn parse_threshold_config(
    raw_threshold: &str,
    raw_lot_size: &str,
) -> Result<ThresholdConfig, AppError> {
    Ok(ThresholdConfig {
        minimum_threshold: parse_threshold(raw_threshold)?,
        reorder_lot_size: Quantity::parse_or(raw_lot_size, Quantity::ONE)
            .map_err(|e| quantity_error("reorderLotSize", &e))?,
    })
}

/// Inline edit of a stock item, as typed by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemEdit {
    pub name: Option<String>,
    pub unit: Option<Unit>,
    pub current_quantity: Option<String>,
    pub minimum_threshold: Option<String>,
}

impl ItemEdit {
    /// Validate and convert into an API patch.
    ///
    /// A non-numeric current quantity becomes `0` and a non-numeric
    /// threshold becomes `1`, so a typo never deactivates an item.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty name, a negative
    /// quantity, or an edit that changes nothing.
    pub fn into_patch(self) -> Result<ItemPatch, AppError> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::Validation("item name cannot be empty".to_string()));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let current_quantity = self
            .current_quantity
            .map(|raw| {
                Quantity::parse_or(&raw, Quantity::ZERO)
                    .map_err(|e| quantity_error("currentQuantity", &e))
            })
            .transpose()?;
        let minimum_threshold = self
            .minimum_threshold
            .as_deref()
            .map(parse_threshold)
            .transpose()?;
        let patch = ItemPatch {
            name,
            unit: self.unit,
            current_quantity,
            minimum_threshold,
        };
        if patch.is_empty() {
            return Err(AppError::Validation("nothing to update".to_string()));
        }
        Ok(patch)
    }
}

/// A stock item with its computed reorder quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderedItem {
    #[serde(flatten)]
    pub item: StockItem,
    /// `None` when the item is inactive.
    pub reorder_quantity: Option<Quantity>,
    pub shortfall: String,
}

impl From<StockItem> for ReorderedItem {
    fn from(item: StockItem) -> Self {
        Self {
            reorder_quantity: compute_reorder_quantity(&item),
            shortfall: shortfall_label(&item),
            item,
        }
    }
}

/// Outcome of a bulk threshold edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdReport {
    /// Entries equal to the stored value; nothing was sent for them.
    pub unchanged: Vec<StockItemId>,
    #[serde(flatten)]
    pub batch: BatchReport<StockItemId, StockItem>,
}

impl ThresholdReport {
    /// Number of items actually updated.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.batch.succeeded.len()
    }
}

/// Outcome of a supplier assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReport {
    /// Key sent with every order, if any (`Idempotency-Key: {key}:{itemId}`).
    pub idempotency_key: Option<Uuid>,
    #[serde(flatten)]
    pub batch: BatchReport<StockItemId, PurchaseOrderLine>,
}

impl AssignmentReport {
    #[must_use]
    pub fn created_orders(&self) -> &[PurchaseOrderLine] {
        &self.batch.succeeded
    }

    #[must_use]
    pub fn errors(&self) -> &[BatchFailure<StockItemId>] {
        &self.batch.failed
    }
}

/// Outcome of copying or moving items between master lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReport {
    pub destination_id: MasterListId,
    pub moved_count: usize,
    /// Names already present in the destination (advisory, not errors).
    pub skipped_names: Vec<String>,
    pub errors: Vec<BatchFailure<StockItemId>>,
    pub abandoned: Vec<StockItemId>,
}

/// Which requested items to transfer and which to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    pub to_transfer: Vec<StockItemId>,
    pub skipped_names: Vec<String>,
    pub missing: Vec<StockItemId>,
}

/// Decide which items go to `destination`.
///
/// An item is skipped when its folded name matches an item already in the
/// destination, or one earlier in the same request. The skipped name is
/// reported as the destination (or first requested) item spells it.
#[must_use]
pub fn plan_transfer(
    source: &MasterList,
    destination: &MasterList,
    item_ids: &[StockItemId],
) -> TransferPlan {
    let mut taken: HashMap<String, String> = destination
        .items
        .iter()
        .map(|item| (fold(&item.name), item.name.clone()))
        .collect();
    let mut plan = TransferPlan::default();
    let mut requested = std::collections::HashSet::new();

    for &id in item_ids {
        if !requested.insert(id) {
            continue;
        }
        let Some(item) = source.item(id) else {
            plan.missing.push(id);
            continue;
        };
        let key = fold(&item.name);
        if let Some(existing) = taken.get(&key) {
            plan.skipped_names.push(existing.clone());
        } else {
            taken.insert(key, item.name.clone());
            plan.to_transfer.push(id);
        }
    }
    plan
}

/// Reorder decisions, threshold edits, supplier assignment, item transfer and
/// purchase-order review for master lists.
#[derive(Debug, Clone)]
pub struct ReplenishmentEngine<A> {
    api: A,
    settings: ServiceSettings,
}

impl<A: MasterListApi> ReplenishmentEngine<A> {
    /// Create a new engine over `api`.
    #[must_use]
    pub const fn new(api: A, settings: ServiceSettings) -> Self {
        Self { api, settings }
    }

    /// Load a master list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn master_list(&self, list_id: MasterListId) -> Result<MasterList, AppError> {
        Ok(self.api.get_master_list(list_id).await?)
    }

    /// Active items of a list matching `filter`, with reorder quantities.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, filter))]
    pub async fn reorder_view(
        &self,
        list_id: MasterListId,
        filter: &ItemFilter,
    ) -> Result<Vec<ReorderedItem>, AppError> {
        let list = self.api.get_master_list(list_id).await?;
        Ok(filter_active_items(&list.items, filter)
            .into_iter()
            .cloned()
            .map(ReorderedItem::from)
            .collect())
    }

    /// Set an item's threshold and lot size.
    ///
    /// Setting the threshold to zero deactivates the item; raising it from
    /// zero reactivates it.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_threshold_config(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        config: ThresholdConfig,
    ) -> Result<ReorderedItem, AppError> {
        let item = self
            .api
            .update_item_config(list_id, item_id, &config)
            .await?;
        info!(
            %item_id,
            threshold = %item.minimum_threshold,
            lot_size = %item.reorder_lot_size,
            active = item.is_active(),
            "Updated threshold config"
        );
        Ok(item.into())
    }

    /// Inline edit of name, unit, current quantity or threshold.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for invalid input, or an error if the
    /// API request fails.
    #[instrument(skip(self, edit))]
    pub async fn update_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        edit: ItemEdit,
    ) -> Result<ReorderedItem, AppError> {
        let patch = edit.into_patch()?;
        let item = self.api.update_item(list_id, item_id, &patch).await?;
        info!(%item_id, "Updated stock item");
        Ok(item.into())
    }

    /// Apply many threshold edits, skipping entries that match the stored value.
    ///
    /// Lot sizes are left as they are.
    ///
    /// # Errors
    ///
    /// Returns error if the master list cannot be loaded. Per-item failures
    /// are reported in the result.
    #[instrument(skip(self, edits, cancel), fields(count = edits.len()))]
    pub async fn bulk_update_thresholds<C>(
        &self,
        list_id: MasterListId,
        edits: &BTreeMap<StockItemId, Quantity>,
        cancel: C,
    ) -> Result<ThresholdReport, AppError>
    where
        C: Future<Output = ()>,
    {
        let list = self.api.get_master_list(list_id).await?;

        let mut unchanged = Vec::new();
        let mut changed = Vec::new();
        for (&item_id, &threshold) in edits {
            match list.item(item_id) {
                Some(item) if item.minimum_threshold == threshold => {
                    debug!(%item_id, "Threshold unchanged, skipping");
                    unchanged.push(item_id);
                }
                _ => changed.push(item_id),
            }
        }

        let list = &list;
        let batch = batch::run(changed, self.settings.concurrency, cancel, |item_id| async move {
            let item = list
                .item(item_id)
                .ok_or_else(|| AppError::NotFound(format!("item {item_id} not found")))?;
            let threshold = edits.get(&item_id).copied().unwrap_or(item.minimum_threshold);
            let config = ThresholdConfig {
                minimum_threshold: threshold,
                reorder_lot_size: item.reorder_lot_size,
            };
            let updated = self
                .api
                .update_item_config(list_id, item_id, &config)
                .await?;
            Ok(updated)
        })
        .await;

        info!(
            applied = batch.succeeded.len(),
            unchanged = unchanged.len(),
            failed = batch.failed.len(),
            "Bulk threshold update finished"
        );
        Ok(ThresholdReport { unchanged, batch })
    }

    /// Create one purchase order per item for `supplier_id`.
    ///
    /// Each order requests the item's computed reorder quantity, including
    /// zero; inactive items are ordered with zero. Unknown items and API
    /// rejections are reported per item and the rest proceed.
    ///
    /// Without a key, calling this twice creates duplicate orders. With
    /// `idempotent_assign` enabled a key is generated when none is given.
    ///
    /// # Errors
    ///
    /// Returns error if the master list cannot be loaded.
    #[instrument(skip(self, item_ids, cancel), fields(count = item_ids.len()))]
    pub async fn assign_supplier<C>(
        &self,
        list_id: MasterListId,
        item_ids: &[StockItemId],
        supplier_id: SupplierId,
        idempotency_key: Option<Uuid>,
        cancel: C,
    ) -> Result<AssignmentReport, AppError>
    where
        C: Future<Output = ()>,
    {
        let list = self.api.get_master_list(list_id).await?;
        let key = idempotency_key.or_else(|| self.settings.idempotent_assign.then(Uuid::new_v4));

        let list = &list;
        let batch = batch::run(
            item_ids.iter().copied(),
            self.settings.concurrency,
            cancel,
            |item_id| async move {
                let item = list
                    .item(item_id)
                    .ok_or_else(|| AppError::NotFound(format!("item {item_id} not found")))?;
                let order = NewOrder {
                    item_id,
                    supplier_id,
                    requested_quantity: compute_reorder_quantity(item).unwrap_or(Quantity::ZERO),
                };
                let header = key.map(|key| format!("{key}:{item_id}"));
                let line = self
                    .api
                    .create_order(list_id, &order, header.as_deref())
                    .await?;
                info!(order_id = %line.id, %item_id, quantity = %line.requested_quantity, "Created purchase order");
                Ok(line)
            },
        )
        .await;

        Ok(AssignmentReport {
            idempotency_key: key,
            batch,
        })
    }

    /// Copy or move items to another master list.
    ///
    /// Items whose name already exists in the destination are skipped and
    /// their names reported. A new destination is created once, before any
    /// transfer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty new-list name or a
    /// destination equal to the source, or an error if a list cannot be
    /// loaded or created.
    #[instrument(skip(self, item_ids, destination, cancel), fields(count = item_ids.len()))]
    pub async fn copy_or_move_items<C>(
        &self,
        source_id: MasterListId,
        item_ids: &[StockItemId],
        destination: Destination,
        mode: TransferMode,
        cancel: C,
    ) -> Result<TransferReport, AppError>
    where
        C: Future<Output = ()>,
    {
        let source = self.api.get_master_list(source_id).await?;
        let destination = match destination {
            Destination::Existing(id) if id == source_id => {
                return Err(AppError::Validation(
                    "destination must differ from the source list".to_string(),
                ));
            }
            Destination::Existing(id) => self.api.get_master_list(id).await?,
            Destination::New { name, area_id } => {
                if name.trim().is_empty() {
                    return Err(AppError::Validation("list name cannot be empty".to_string()));
                }
                let created = self
                    .api
                    .create_master_list(&NewMasterList {
                        name: name.trim().to_string(),
                        area_id,
                    })
                    .await?;
                info!(list_id = %created.id, name = %created.name, "Created destination list");
                created
            }
        };

        let plan = plan_transfer(&source, &destination, item_ids);
        for name in &plan.skipped_names {
            debug!(%name, "Already in destination, skipping");
        }

        let request = TransferRequest {
            destination_list_id: destination.id,
            mode,
        };
        let request = &request;
        let batch = batch::run(
            plan.to_transfer,
            self.settings.concurrency,
            cancel,
            |item_id| async move {
                self.api
                    .transfer_item(source_id, item_id, request)
                    .await
                    .map_err(AppError::from)
            },
        )
        .await;

        let mut errors: Vec<BatchFailure<StockItemId>> = plan
            .missing
            .into_iter()
            .map(|id| BatchFailure {
                id,
                message: format!("item {id} not found"),
                retryable: false,
            })
            .collect();
        errors.extend(batch.failed);

        info!(
            %mode,
            destination = %destination.id,
            moved = batch.succeeded.len(),
            skipped = plan.skipped_names.len(),
            "Transfer finished"
        );
        Ok(TransferReport {
            destination_id: destination.id,
            moved_count: batch.succeeded.len(),
            skipped_names: plan.skipped_names,
            errors,
            abandoned: batch.abandoned,
        })
    }

    /// Change the quantity of a pending purchase order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a zero quantity,
    /// [`AppError::Conflict`] if the order was already decided, or an error
    /// if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_order_quantity(
        &self,
        order_id: PurchaseOrderId,
        quantity: Quantity,
    ) -> Result<PurchaseOrderLine, AppError> {
        if !quantity.is_positive() {
            return Err(AppError::Validation(
                "quantity must be greater than zero".to_string(),
            ));
        }
        let order = self.api.get_order(order_id).await?;
        if !order.is_pending() {
            return Err(AppError::Conflict(format!(
                "order {order_id} is {} and can no longer be edited",
                order.status
            )));
        }
        let updated = self.api.update_order_quantity(order_id, quantity).await?;
        info!(%order_id, %quantity, "Updated order quantity");
        Ok(updated)
    }

    /// Approve pending purchase orders. A single approval is a batch of one.
    pub async fn approve_orders<C>(
        &self,
        order_ids: &[PurchaseOrderId],
        cancel: C,
    ) -> BatchReport<PurchaseOrderId, PurchaseOrderLine>
    where
        C: Future<Output = ()>,
    {
        self.decide_orders(order_ids, OrderStatus::Aprovado, cancel)
            .await
    }

    /// Reject pending purchase orders.
    pub async fn reject_orders<C>(
        &self,
        order_ids: &[PurchaseOrderId],
        cancel: C,
    ) -> BatchReport<PurchaseOrderId, PurchaseOrderLine>
    where
        C: Future<Output = ()>,
    {
        self.decide_orders(order_ids, OrderStatus::Rejeitado, cancel)
            .await
    }

    #[instrument(skip(self, order_ids, cancel), fields(count = order_ids.len()))]
    async fn decide_orders<C>(
        &self,
        order_ids: &[PurchaseOrderId],
        status: OrderStatus,
        cancel: C,
    ) -> BatchReport<PurchaseOrderId, PurchaseOrderLine>
    where
        C: Future<Output = ()>,
    {
        batch::run(
            order_ids.iter().copied(),
            self.settings.concurrency,
            cancel,
            |order_id| async move {
                let order = self.api.get_order(order_id).await?;
                if !order.is_pending() {
                    return Err(AppError::Conflict(format!(
                        "order {order_id} was already {}",
                        order.status
                    )));
                }
                let updated = self.api.set_order_status(order_id, status).await?;
                info!(%order_id, %status, "Order decided");
                Ok(updated)
            },
        )
        .await
    }
}
