//! Master list and purchase order commands.
//!
//! # Usage
//!
//! ```bash
//! pantry master-list show 4 --name arroz
//! pantry master-list show 4 --kind volume
//! pantry master-list config 4 12 --threshold 5 --lot-size 10
//! pantry master-list edit 4 12 --current 2,5
//! pantry master-list thresholds 4 12=5 13=0
//! pantry master-list assign-supplier 4 --supplier 9 12 13
//! pantry master-list transfer 4 12 13 --new-list "Bar" --move
//! pantry orders approve 101 102
//! ```

use std::collections::BTreeMap;

use clap::{Args, Subcommand};
use pantry_admin::api::PantryClient;
use pantry_admin::error::AppError;
use pantry_admin::models::{Destination, ItemFilter, TransferMode};
use pantry_admin::services::replenishment::{parse_threshold, parse_threshold_config};
use pantry_admin::services::{ItemEdit, ReplenishmentEngine};
use pantry_core::{
    AreaId, MasterListId, PurchaseOrderId, Quantity, StockItemId, SupplierId, Unit, UnitKind,
};
use uuid::Uuid;

use super::{CommandError, Context, emit, finish, interrupted, parse_pair, settle};

#[derive(Subcommand)]
pub enum MasterListAction {
    /// Active items with their reorder quantities
    Show {
        list: MasterListId,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Set threshold and lot size of an item (non-numeric input becomes 1)
    Config {
        list: MasterListId,
        item: StockItemId,
        #[arg(long)]
        threshold: String,
        #[arg(long)]
        lot_size: String,
    },
    /// Inline edit of an item (non-numeric current becomes 0, threshold becomes 1)
    Edit {
        list: MasterListId,
        item: StockItemId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        unit: Option<Unit>,
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        threshold: Option<String>,
    },
    /// Set many thresholds at once, as ITEM=THRESHOLD
    Thresholds {
        list: MasterListId,
        #[arg(required = true, value_parser = parse_threshold_pair)]
        edits: Vec<(StockItemId, Quantity)>,
    },
    /// Create one purchase order per item for a supplier
    AssignSupplier {
        list: MasterListId,
        #[arg(long)]
        supplier: SupplierId,
        #[arg(required = true)]
        items: Vec<StockItemId>,
        /// Reuse a key to make a retried assignment safe
        #[arg(long)]
        idempotency_key: Option<Uuid>,
    },
    /// Copy or move items to another list
    Transfer {
        list: MasterListId,
        #[arg(required = true)]
        items: Vec<StockItemId>,
        #[arg(long, conflicts_with = "new_list", required_unless_present = "new_list")]
        to: Option<MasterListId>,
        /// Create a new list with this name as the destination
        #[arg(long)]
        new_list: Option<String>,
        #[arg(long, requires = "new_list")]
        area: Option<AreaId>,
        /// Remove the items from the source list
        #[arg(long = "move")]
        move_items: bool,
    },
}

#[derive(Args)]
pub struct FilterArgs {
    /// Accent- and case-insensitive name search
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    unit: Option<Unit>,
    /// mass, volume or count
    #[arg(long, conflicts_with = "unit")]
    kind: Option<UnitKind>,
    #[arg(long)]
    min_reorder: Option<Quantity>,
    #[arg(long)]
    max_reorder: Option<Quantity>,
}

impl From<FilterArgs> for ItemFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            name: args.name,
            unit: args.unit,
            unit_kind: args.kind,
            min_reorder: args.min_reorder,
            max_reorder: args.max_reorder,
        }
    }
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// Change the quantity of a pending order
    SetQuantity {
        order: PurchaseOrderId,
        quantity: Quantity,
    },
    /// Approve pending orders
    Approve {
        #[arg(required = true)]
        orders: Vec<PurchaseOrderId>,
    },
    /// Reject pending orders
    Reject {
        #[arg(required = true)]
        orders: Vec<PurchaseOrderId>,
    },
}

fn parse_threshold_pair(raw: &str) -> Result<(StockItemId, Quantity), String> {
    let (item, threshold): (StockItemId, String) = parse_pair(raw)?;
    let threshold = parse_threshold(&threshold)
        .map_err(|e| e.user_message())?;
    Ok((item, threshold))
}

fn engine(ctx: &Context) -> ReplenishmentEngine<PantryClient> {
    ReplenishmentEngine::new(ctx.client.clone(), ctx.settings)
}

/// Run a `master-list` subcommand.
///
/// # Errors
///
/// Returns error if the command as a whole failed.
pub async fn master_list(ctx: &Context, action: MasterListAction) -> Result<(), CommandError> {
    let engine = engine(ctx);
    match action {
        MasterListAction::Show { list, filter } => {
            emit(&engine.reorder_view(list, &filter.into()).await?)
        }
        MasterListAction::Config {
            list,
            item,
            threshold,
            lot_size,
        } => {
            let config = parse_threshold_config(&threshold, &lot_size)?;
            emit(&engine.update_threshold_config(list, item, config).await?)
        }
        MasterListAction::Edit {
            list,
            item,
            name,
            unit,
            current,
            threshold,
        } => {
            let edit = ItemEdit {
                name,
                unit,
                current_quantity: current,
                minimum_threshold: threshold,
            };
            emit(&engine.update_item(list, item, edit).await?)
        }
        MasterListAction::Thresholds { list, edits } => {
            let edits: BTreeMap<StockItemId, Quantity> = edits.into_iter().collect();
            let report = engine
                .bulk_update_thresholds(list, &edits, interrupted())
                .await?;
            emit(&report)?;
            if !report.unchanged.is_empty() {
                tracing::info!(count = report.unchanged.len(), "Unchanged thresholds skipped");
            }
            settle(&report.batch, "updated")
        }
        MasterListAction::AssignSupplier {
            list,
            supplier,
            items,
            idempotency_key,
        } => {
            let report = engine
                .assign_supplier(list, &items, supplier, idempotency_key, interrupted())
                .await?;
            emit(&report)?;
            if let Some(key) = report.idempotency_key {
                tracing::info!("Re-run with --idempotency-key {key} to retry safely");
            }
            settle(&report.batch, "ordered")
        }
        MasterListAction::Transfer {
            list,
            items,
            to,
            new_list,
            area,
            move_items,
        } => {
            let destination = match (to, new_list) {
                (Some(id), _) => Destination::Existing(id),
                (None, Some(name)) => Destination::New {
                    name,
                    area_id: area,
                },
                (None, None) => {
                    return Err(AppError::Validation(
                        "choose --to or --new-list".to_string(),
                    )
                    .into());
                }
            };
            let mode = if move_items {
                TransferMode::Move
            } else {
                TransferMode::Copy
            };
            let report = engine
                .copy_or_move_items(list, &items, destination, mode, interrupted())
                .await?;
            emit(&report)?;
            for name in &report.skipped_names {
                tracing::warn!(%name, "Already in the destination list, skipped");
            }
            if report.moved_count == 0 && !(report.errors.is_empty() && report.abandoned.is_empty()) {
                return Err(CommandError::NothingSucceeded(format!(
                    "no item could be transferred ({} failed)",
                    report.errors.len() + report.abandoned.len()
                )));
            }
            Ok(())
        }
    }
}

/// Run an `orders` subcommand.
///
/// # Errors
///
/// Returns error if the command as a whole failed.
pub async fn orders(ctx: &Context, action: OrderAction) -> Result<(), CommandError> {
    let engine = engine(ctx);
    match action {
        OrderAction::SetQuantity { order, quantity } => {
            emit(&engine.update_order_quantity(order, quantity).await?)
        }
        OrderAction::Approve { orders } => {
            finish(&engine.approve_orders(&orders, interrupted()).await, "approved")
        }
        OrderAction::Reject { orders } => {
            finish(&engine.reject_orders(&orders, interrupted()).await, "rejected")
        }
    }
}
