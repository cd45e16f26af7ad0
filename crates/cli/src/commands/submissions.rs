//! Submission workflow commands.
//!
//! # Usage
//!
//! ```bash
//! pantry submissions list --all --search cozinha --sort status --asc
//! pantry submissions approve 31 32 --message "ok"
//! pantry submissions reject 33 --message "estoque suficiente"
//! pantry submissions archive 31 32 33
//! pantry submissions add-item 40 --name Guardanapo --unit pct --priority urgente
//! pantry submissions checklist 31 --quantity 5=3 --no-observations
//! ```

use clap::{Args, Subcommand};
use pantry_admin::api::PantryClient;
use pantry_admin::models::{
    ConvertOptions, ListingQuery, NewSubmittedItem, SortDirection, SortKey, SubmissionView,
    SubmittedItemPatch,
};
use pantry_admin::services::{SubmissionWorkflow, SubmitOutcome};
use pantry_core::{
    ItemRef, OrderStatus, Priority, Quantity, SubmissionId, SubmissionStatus, SubmittedItemId, Unit,
};

use super::{CommandError, Context, emit, finish, interrupted, parse_pair};

#[derive(Subcommand)]
pub enum SubmissionAction {
    /// Rows of the active or archived view
    List {
        #[command(flatten)]
        view: ViewArgs,
        /// Free text over name, submitter, date and status
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "date")]
        sort: SortKey,
        /// Sort ascending (default is descending)
        #[arg(long)]
        asc: bool,
    },
    /// One list with its items
    Show { id: SubmissionId },
    /// Submit a quick-list draft
    Submit { id: SubmissionId },
    /// Approve pending lists
    Approve {
        #[arg(required = true)]
        ids: Vec<SubmissionId>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Reject pending lists (a reason is required)
    Reject {
        #[arg(required = true)]
        ids: Vec<SubmissionId>,
        #[arg(long)]
        message: String,
    },
    /// Undo an approval or rejection
    Revert { id: SubmissionId },
    /// Archive lists (any status)
    Archive {
        #[arg(required = true)]
        ids: Vec<SubmissionId>,
    },
    /// Return archived lists to the active view
    Unarchive {
        #[arg(required = true)]
        ids: Vec<SubmissionId>,
    },
    /// Permanently delete archived lists
    Delete {
        #[arg(required = true)]
        ids: Vec<SubmissionId>,
    },
    /// Mark a quick-list item as resolved without purchase
    Discard { id: SubmissionId, item: SubmittedItemId },
    /// Undo a discard
    Restore { id: SubmissionId, item: SubmittedItemId },
    /// Add an item to an editable list
    AddItem {
        id: SubmissionId,
        #[command(flatten)]
        item: NewItemArgs,
    },
    /// Edit an item of an editable list
    EditItem {
        id: SubmissionId,
        item: SubmittedItemId,
        #[arg(long)]
        quantity: Option<Quantity>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        observation: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        /// Line decision, traditional lists only
        #[arg(long, value_parser = parse_order_status)]
        decision: Option<OrderStatus>,
    },
    /// Remove an item from an editable list
    RemoveItem { id: SubmissionId, item: SubmittedItemId },
    /// Export an approved list to a new checklist
    Checklist {
        id: SubmissionId,
        #[arg(long)]
        name: Option<String>,
        /// Quantity override, as ITEM=QUANTITY
        #[arg(long = "quantity", value_parser = parse_pair::<SubmittedItemId, Quantity>)]
        quantities: Vec<(SubmittedItemId, Quantity)>,
        #[arg(long)]
        no_supplier: bool,
        #[arg(long)]
        no_observations: bool,
    },
}

#[derive(Args)]
#[group(multiple = false)]
pub struct ViewArgs {
    /// Archived lists
    #[arg(long)]
    archived: bool,
    /// Active lists of every status
    #[arg(long)]
    all: bool,
    /// Active lists with this status (default PENDENTE)
    #[arg(long)]
    status: Option<SubmissionStatus>,
}

impl From<ViewArgs> for SubmissionView {
    fn from(args: ViewArgs) -> Self {
        if args.archived {
            Self::Archived
        } else if args.all {
            Self::Active(None)
        } else {
            args.status
                .map_or_else(Self::default, |status| Self::Active(Some(status)))
        }
    }
}

#[derive(Args)]
pub struct NewItemArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "un")]
    unit: Unit,
    /// `global_<id>` or `fornecedor_<id>`; omit for a temporary item
    #[arg(long = "ref")]
    item_ref: Option<ItemRef>,
    #[arg(long)]
    quantity: Option<Quantity>,
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long)]
    observation: Option<String>,
    /// Propose the item for the permanent catalog
    #[arg(long)]
    suggest: bool,
}

impl From<NewItemArgs> for NewSubmittedItem {
    fn from(args: NewItemArgs) -> Self {
        let mut item = Self::temporary(&args.name, args.unit);
        if let Some(item_ref) = args.item_ref {
            item.item_ref = item_ref;
        }
        item.requested_quantity = args.quantity;
        item.priority = args.priority;
        item.observation = args.observation;
        item.suggested_for_catalog = args.suggest;
        item
    }
}

fn parse_order_status(raw: &str) -> Result<OrderStatus, String> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "PENDENTE" => Ok(OrderStatus::Pendente),
        "APROVADO" => Ok(OrderStatus::Aprovado),
        "REJEITADO" => Ok(OrderStatus::Rejeitado),
        _ => Err(format!("invalid decision: {raw}")),
    }
}

/// Run a `submissions` subcommand.
///
/// # Errors
///
/// Returns error if the command as a whole failed.
pub async fn run(ctx: &Context, action: SubmissionAction) -> Result<(), CommandError> {
    let workflow: SubmissionWorkflow<PantryClient> =
        SubmissionWorkflow::new(ctx.client.clone(), ctx.settings);

    match action {
        SubmissionAction::List {
            view,
            search,
            sort,
            asc,
        } => {
            let query = ListingQuery {
                search,
                sort,
                direction: if asc {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                },
            };
            emit(&workflow.list(view.into(), &query).await?)
        }
        SubmissionAction::Show { id } => emit(&workflow.get(id).await?),
        SubmissionAction::Submit { id } => {
            let outcome = workflow.submit(id).await?;
            if matches!(outcome, SubmitOutcome::StillDraft(_)) {
                tracing::warn!(submission_id = %id, "List has no items and stays a draft");
            }
            emit(&outcome)
        }
        SubmissionAction::Approve { ids, message } => finish(
            &workflow
                .approve_many(&ids, message.as_deref(), interrupted())
                .await,
            "approved",
        ),
        SubmissionAction::Reject { ids, message } => finish(
            &workflow.reject_many(&ids, &message, interrupted()).await?,
            "rejected",
        ),
        SubmissionAction::Revert { id } => emit(&workflow.revert(id).await?),
        SubmissionAction::Archive { ids } => {
            finish(&workflow.archive_many(&ids, interrupted()).await, "archived")
        }
        SubmissionAction::Unarchive { ids } => finish(
            &workflow.unarchive_many(&ids, interrupted()).await,
            "unarchived",
        ),
        SubmissionAction::Delete { ids } => {
            finish(&workflow.delete_many(&ids, interrupted()).await, "deleted")
        }
        SubmissionAction::Discard { id, item } => emit(&workflow.discard_item(id, item).await?),
        SubmissionAction::Restore { id, item } => emit(&workflow.restore_item(id, item).await?),
        SubmissionAction::AddItem { id, item } => {
            emit(&workflow.add_items(id, &[item.into()]).await?)
        }
        SubmissionAction::EditItem {
            id,
            item,
            quantity,
            priority,
            observation,
            supplier,
            decision,
        } => {
            let patch = SubmittedItemPatch {
                requested_quantity: quantity,
                priority,
                observation,
                supplier,
                order_status: decision,
            };
            emit(&workflow.update_item(id, item, &patch).await?)
        }
        SubmissionAction::RemoveItem { id, item } => {
            workflow.remove_item(id, item).await?;
            tracing::info!(submission_id = %id, %item, "Item removed");
            Ok(())
        }
        SubmissionAction::Checklist {
            id,
            name,
            quantities,
            no_supplier,
            no_observations,
        } => {
            let options = ConvertOptions {
                name,
                item_quantities: quantities.into_iter().collect(),
                include_supplier: !no_supplier,
                include_observations: !no_observations,
            };
            emit(&workflow.convert_to_checklist(id, &options).await?)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_args() {
        let view = |archived, all, status| {
            SubmissionView::from(ViewArgs {
                archived,
                all,
                status,
            })
        };
        assert_eq!(view(false, false, None), SubmissionView::default());
        assert_eq!(view(true, false, None), SubmissionView::Archived);
        assert_eq!(view(false, true, None), SubmissionView::Active(None));
        assert_eq!(
            view(false, false, Some(SubmissionStatus::Aprovado)),
            SubmissionView::Active(Some(SubmissionStatus::Aprovado))
        );
    }

    #[test]
    fn test_new_item_args() {
        let item = NewSubmittedItem::from(NewItemArgs {
            name: "Arroz".to_string(),
            unit: Unit::Kilogram,
            item_ref: Some("global_12".parse().unwrap()),
            quantity: None,
            priority: Some(Priority::Urgente),
            observation: None,
            suggest: false,
        });
        assert!(!item.item_ref.is_temporary());
        assert_eq!(item.priority, Some(Priority::Urgente));

        let temporary = NewSubmittedItem::from(NewItemArgs {
            name: "Guardanapo".to_string(),
            unit: Unit::Package,
            item_ref: None,
            quantity: None,
            priority: None,
            observation: None,
            suggest: true,
        });
        assert!(temporary.item_ref.is_temporary());
        assert!(temporary.suggested_for_catalog);
    }

    #[test]
    fn test_parse_order_status() {
        assert_eq!(parse_order_status("aprovado").unwrap(), OrderStatus::Aprovado);
        assert!(parse_order_status("talvez").is_err());
    }
}
