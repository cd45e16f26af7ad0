//! In-process back-office used by tests and local runs.
//!
//! Mirrors the API's guards and status codes: 404 for unknown ids, 409 for
//! lifecycle conflicts, 422 for invalid input. Failures can be injected per
//! entity to exercise partial-failure paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use pantry_core::text::names_match;
use pantry_core::{
    ChecklistId, ListKind, MasterListId, OrderStatus, PurchaseOrderId, Quantity, StockItemId,
    SubmissionId, SubmissionStatus, SubmittedItemId,
};
use tokio::sync::RwLock;

use super::{ApiError, MasterListApi, SubmissionsApi};
use crate::models::checklist::snapshot_items;
use crate::models::{
    Action, Checklist, ConvertOptions, ItemPatch, MasterList, NewMasterList, NewOrder,
    NewSubmittedItem, PurchaseOrderLine, StockItem, SubmissionSummary, SubmissionView,
    SubmittedItem, SubmittedItemPatch, SubmittedList, ThresholdConfig, TransferMode,
    TransferRequest, TransitionError,
};

/// Entity an injected failure is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureTarget {
    MasterList(MasterListId),
    StockItem(StockItemId),
    Order(PurchaseOrderId),
    Submission(SubmissionId),
    /// `GET /submissions`
    SubmissionListing,
}

/// In-memory implementation of [`MasterListApi`] and [`SubmissionsApi`].
#[derive(Clone, Default)]
pub struct InMemoryBackOffice {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    master_lists: BTreeMap<MasterListId, MasterList>,
    orders: BTreeMap<PurchaseOrderId, PurchaseOrderLine>,
    submissions: BTreeMap<SubmissionId, SubmittedList>,
    checklists: Vec<Checklist>,
    idempotency: HashMap<String, PurchaseOrderId>,
    failures: HashMap<FailureTarget, (u16, String)>,
    writes: Vec<String>,
    last_id: i64,
}

/// Generated ids start here so they never collide with seeded ones.
const FIRST_GENERATED_ID: i64 = 10_000;

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id = self.last_id.max(FIRST_GENERATED_ID) + 1;
        self.last_id
    }

    fn injected(&self, target: FailureTarget) -> Result<(), ApiError> {
        match self.failures.get(&target) {
            Some((status, message)) => Err(ApiError::status(*status, message.clone())),
            None => Ok(()),
        }
    }

    fn record(&mut self, method: &str, path: String) {
        self.writes.push(format!("{method} /{path}"));
    }

    fn master_list_mut(&mut self, id: MasterListId) -> Result<&mut MasterList, ApiError> {
        self.master_lists
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("master list {id} not found")))
    }

    fn stock_item_mut(
        &mut self,
        list_id: MasterListId,
        item_id: StockItemId,
    ) -> Result<&mut StockItem, ApiError> {
        self.master_list_mut(list_id)?
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ApiError::NotFound(format!("item {item_id} not found")))
    }

    fn order_mut(&mut self, id: PurchaseOrderId) -> Result<&mut PurchaseOrderLine, ApiError> {
        self.orders
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("order {id} not found")))
    }

    fn submission_mut(&mut self, id: SubmissionId) -> Result<&mut SubmittedList, ApiError> {
        self.submissions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))
    }

    /// Look up a submission and check that `action` is allowed on it.
    fn guarded(
        &mut self,
        id: SubmissionId,
        action: Action,
    ) -> Result<&mut SubmittedList, ApiError> {
        self.injected(FailureTarget::Submission(id))?;
        let list = self.submission_mut(id)?;
        list.check(action).map_err(transition_error)?;
        Ok(list)
    }
}

fn transition_error(err: TransitionError) -> ApiError {
    match err {
        TransitionError::NothingToSubmit => ApiError::status(422, err.to_string()),
        _ => ApiError::status(409, err.to_string()),
    }
}

fn validation(message: &str) -> ApiError {
    ApiError::status(422, message)
}

/// Apply an approve/reject decision to a list.
///
/// Traditional lists decide every pending line and take the derived status,
/// which is partial when earlier line decisions disagree.
fn decide(list: &mut SubmittedList, line: OrderStatus, whole: SubmissionStatus) {
    if list.kind == ListKind::Traditional {
        for item in list.items.iter_mut().filter(|item| !item.discarded) {
            if item.order_status.unwrap_or_default() == OrderStatus::Pendente {
                item.order_status = Some(line);
            }
        }
        list.status = match list.derived_status() {
            SubmissionStatus::Pendente => whole,
            derived => derived,
        };
    } else {
        list.status = whole;
    }
}

impl InMemoryBackOffice {
    /// Create an empty back-office.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a master list.
    pub async fn insert_master_list(&self, list: MasterList) {
        self.state.write().await.master_lists.insert(list.id, list);
    }

    /// Seed a submitted list.
    pub async fn insert_submission(&self, list: SubmittedList) {
        self.state.write().await.submissions.insert(list.id, list);
    }

    /// Seed a purchase order.
    pub async fn insert_order(&self, order: PurchaseOrderLine) {
        self.state.write().await.orders.insert(order.id, order);
    }

    /// Make every call touching `target` fail with `status` and `message`.
    pub async fn fail(&self, target: FailureTarget, status: u16, message: &str) {
        self.state
            .write()
            .await
            .failures
            .insert(target, (status, message.to_string()));
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        self.state.write().await.failures.clear();
    }

    /// Current state of a master list.
    pub async fn master_list_snapshot(&self, id: MasterListId) -> Option<MasterList> {
        self.state.read().await.master_lists.get(&id).cloned()
    }

    /// Current state of a submitted list.
    pub async fn submission_snapshot(&self, id: SubmissionId) -> Option<SubmittedList> {
        self.state.read().await.submissions.get(&id).cloned()
    }

    /// All purchase orders, by id.
    pub async fn orders(&self) -> Vec<PurchaseOrderLine> {
        self.state.read().await.orders.values().cloned().collect()
    }

    /// All checklists, in creation order.
    pub async fn checklists(&self) -> Vec<Checklist> {
        self.state.read().await.checklists.clone()
    }

    /// Log of mutating calls, as `METHOD /path`.
    pub async fn writes(&self) -> Vec<String> {
        self.state.read().await.writes.clone()
    }
}

impl std::fmt::Debug for InMemoryBackOffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackOffice").finish_non_exhaustive()
    }
}

impl MasterListApi for InMemoryBackOffice {
    async fn get_master_list(&self, id: MasterListId) -> Result<MasterList, ApiError> {
        let state = self.state.read().await;
        state.injected(FailureTarget::MasterList(id))?;
        state
            .master_lists
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("master list {id} not found")))
    }

    async fn create_master_list(&self, input: &NewMasterList) -> Result<MasterList, ApiError> {
        if input.name.trim().is_empty() {
            return Err(validation("list name is required"));
        }
        let mut state = self.state.write().await;
        let list = MasterList {
            id: MasterListId::new(state.next_id()),
            name: input.name.trim().to_string(),
            area_id: input.area_id,
            items: Vec::new(),
        };
        state.master_lists.insert(list.id, list.clone());
        state.record("POST", "master-lists".to_string());
        Ok(list)
    }

    async fn update_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        patch: &ItemPatch,
    ) -> Result<StockItem, ApiError> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(validation("item name is required"));
        }
        let mut state = self.state.write().await;
        state.injected(FailureTarget::StockItem(item_id))?;
        let item = state.stock_item_mut(list_id, item_id)?;
        patch.apply_to(item);
        let updated = item.clone();
        state.record("PUT", format!("master-lists/{list_id}/items/{item_id}"));
        Ok(updated)
    }

    async fn update_item_config(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        config: &ThresholdConfig,
    ) -> Result<StockItem, ApiError> {
        let mut state = self.state.write().await;
        state.injected(FailureTarget::StockItem(item_id))?;
        let item = state.stock_item_mut(list_id, item_id)?;
        item.minimum_threshold = config.minimum_threshold;
        item.reorder_lot_size = config.reorder_lot_size;
        let updated = item.clone();
        state.record(
            "PUT",
            format!("master-lists/{list_id}/items/{item_id}/config"),
        );
        Ok(updated)
    }

    async fn transfer_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        request: &TransferRequest,
    ) -> Result<StockItem, ApiError> {
        let destination_id = request.destination_list_id;
        if destination_id == list_id {
            return Err(validation("destination must differ from the source list"));
        }
        let mut state = self.state.write().await;
        state.injected(FailureTarget::StockItem(item_id))?;
        let source = state.stock_item_mut(list_id, item_id)?.clone();
        let new_id = StockItemId::new(state.next_id());

        let destination = state.master_list_mut(destination_id)?;
        if destination
            .items
            .iter()
            .any(|existing| names_match(&existing.name, &source.name))
        {
            return Err(ApiError::status(
                409,
                format!("{} already exists in the destination list", source.name),
            ));
        }
        let copied = StockItem {
            id: new_id,
            ..source
        };
        destination.items.push(copied.clone());

        if request.mode == TransferMode::Move {
            state
                .master_list_mut(list_id)?
                .items
                .retain(|item| item.id != item_id);
        }
        state.record(
            "POST",
            format!("master-lists/{list_id}/items/{item_id}/transfer"),
        );
        Ok(copied)
    }

    async fn create_order(
        &self,
        list_id: MasterListId,
        order: &NewOrder,
        idempotency_key: Option<&str>,
    ) -> Result<PurchaseOrderLine, ApiError> {
        let mut state = self.state.write().await;
        state.injected(FailureTarget::StockItem(order.item_id))?;

        if let Some(existing) = idempotency_key
            .and_then(|key| state.idempotency.get(key))
            .and_then(|id| state.orders.get(id))
        {
            return Ok(existing.clone());
        }

        let item_name = state.stock_item_mut(list_id, order.item_id)?.name.clone();
        let line = PurchaseOrderLine {
            id: PurchaseOrderId::new(state.next_id()),
            master_list_id: list_id,
            item_id: order.item_id,
            item_name,
            supplier_id: order.supplier_id,
            requested_quantity: order.requested_quantity,
            status: OrderStatus::Pendente,
            requested_by: None,
            requested_at: Utc::now(),
        };
        state.orders.insert(line.id, line.clone());
        if let Some(key) = idempotency_key {
            state.idempotency.insert(key.to_string(), line.id);
        }
        state.record("POST", format!("master-lists/{list_id}/orders"));
        Ok(line)
    }

    async fn get_order(&self, id: PurchaseOrderId) -> Result<PurchaseOrderLine, ApiError> {
        let state = self.state.read().await;
        state.injected(FailureTarget::Order(id))?;
        state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("order {id} not found")))
    }

    async fn update_order_quantity(
        &self,
        id: PurchaseOrderId,
        quantity: Quantity,
    ) -> Result<PurchaseOrderLine, ApiError> {
        if !quantity.is_positive() {
            return Err(validation("quantity must be greater than zero"));
        }
        let mut state = self.state.write().await;
        state.injected(FailureTarget::Order(id))?;
        let order = state.order_mut(id)?;
        if !order.is_pending() {
            return Err(ApiError::status(
                409,
                format!("order {id} is {} and can no longer be edited", order.status),
            ));
        }
        order.requested_quantity = quantity;
        let updated = order.clone();
        state.record("PUT", format!("orders/{id}"));
        Ok(updated)
    }

    async fn set_order_status(
        &self,
        id: PurchaseOrderId,
        status: OrderStatus,
    ) -> Result<PurchaseOrderLine, ApiError> {
        if !status.is_decided() {
            return Err(validation("status must be APROVADO or REJEITADO"));
        }
        let mut state = self.state.write().await;
        state.injected(FailureTarget::Order(id))?;
        let order = state.order_mut(id)?;
        if !order.is_pending() {
            return Err(ApiError::status(
                409,
                format!("order {id} was already {}", order.status),
            ));
        }
        order.status = status;
        let updated = order.clone();
        state.record("PUT", format!("orders/{id}/status"));
        Ok(updated)
    }
}

impl SubmissionsApi for InMemoryBackOffice {
    async fn list_submissions(
        &self,
        view: SubmissionView,
    ) -> Result<Vec<SubmissionSummary>, ApiError> {
        let state = self.state.read().await;
        state.injected(FailureTarget::SubmissionListing)?;
        Ok(state
            .submissions
            .values()
            .map(SubmittedList::summary)
            .filter(|row| view.includes(row))
            .collect())
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        let state = self.state.read().await;
        state.injected(FailureTarget::Submission(id))?;
        state
            .submissions
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))
    }

    async fn submit(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::Submit)?;
        list.status = SubmissionStatus::Pendente;
        list.submitted_at = Some(Utc::now());
        let updated = list.clone();
        state.record("POST", format!("submissions/{id}/submit"));
        Ok(updated)
    }

    async fn approve(
        &self,
        id: SubmissionId,
        admin_message: Option<&str>,
    ) -> Result<SubmittedList, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::Approve)?;
        decide(list, OrderStatus::Aprovado, SubmissionStatus::Aprovado);
        list.admin_message = admin_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        let updated = list.clone();
        state.record("PUT", format!("submissions/{id}/approve"));
        Ok(updated)
    }

    async fn reject(&self, id: SubmissionId, admin_message: &str) -> Result<SubmittedList, ApiError> {
        if admin_message.trim().is_empty() {
            return Err(validation("a reason is required to reject a list"));
        }
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::Reject)?;
        decide(list, OrderStatus::Rejeitado, SubmissionStatus::Rejeitado);
        list.admin_message = Some(admin_message.trim().to_string());
        let updated = list.clone();
        state.record("PUT", format!("submissions/{id}/reject"));
        Ok(updated)
    }

    async fn revert(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::Revert)?;
        if list.kind == ListKind::Traditional {
            for item in &mut list.items {
                if item.order_status.is_some() {
                    item.order_status = Some(OrderStatus::Pendente);
                }
            }
        }
        list.status = SubmissionStatus::Pendente;
        list.admin_message = None;
        let updated = list.clone();
        state.record("POST", format!("submissions/{id}/revert"));
        Ok(updated)
    }

    async fn archive(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::Archive)?;
        list.archived = true;
        let updated = list.clone();
        state.record("POST", format!("submissions/{id}/archive"));
        Ok(updated)
    }

    async fn unarchive(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::Unarchive)?;
        list.archived = false;
        let updated = list.clone();
        state.record("POST", format!("submissions/{id}/unarchive"));
        Ok(updated)
    }

    async fn delete_submission(&self, id: SubmissionId) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state.guarded(id, Action::Delete)?;
        state.submissions.remove(&id);
        state.record("DELETE", format!("submissions/{id}"));
        Ok(())
    }

    async fn set_item_discarded(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        discarded: bool,
    ) -> Result<SubmittedItem, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::ToggleDiscard)?;
        let item = list
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ApiError::NotFound(format!("item {item_id} not found")))?;
        item.check_discard(discarded).map_err(transition_error)?;
        item.discarded = discarded;
        let updated = item.clone();
        let action = if discarded { "discard" } else { "restore" };
        state.record("PUT", format!("submissions/{id}/items/{item_id}/{action}"));
        Ok(updated)
    }

    async fn add_items(
        &self,
        id: SubmissionId,
        items: &[NewSubmittedItem],
    ) -> Result<SubmittedList, ApiError> {
        if items.iter().any(|item| item.item_name.trim().is_empty()) {
            return Err(validation("item name is required"));
        }
        let mut state = self.state.write().await;
        state.guarded(id, Action::EditItems)?;
        let ids: Vec<SubmittedItemId> = items
            .iter()
            .map(|_| SubmittedItemId::new(state.next_id()))
            .collect();
        let list = state.submission_mut(id)?;
        let order_status = (list.kind == ListKind::Traditional).then_some(OrderStatus::Pendente);
        for (new_id, item) in ids.into_iter().zip(items) {
            list.items.push(SubmittedItem {
                id: new_id,
                item_ref: item.item_ref.clone(),
                item_name: item.item_name.trim().to_string(),
                unit: item.unit,
                requested_quantity: item.requested_quantity,
                priority: item.priority,
                observation: item.observation.clone(),
                discarded: false,
                suggested_for_catalog: item.suggested_for_catalog,
                supplier: None,
                order_status,
            });
        }
        let updated = list.clone();
        state.record("POST", format!("submissions/{id}/items"));
        Ok(updated)
    }

    async fn update_submitted_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        patch: &SubmittedItemPatch,
    ) -> Result<SubmittedItem, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::EditItems)?;
        if patch.order_status.is_some() && list.kind != ListKind::Traditional {
            return Err(transition_error(TransitionError::WrongKind {
                action: Action::EditItems,
                kind: list.kind,
            }));
        }
        let item = list
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ApiError::NotFound(format!("item {item_id} not found")))?;
        patch.apply_to(item);
        let updated = item.clone();
        state.record("PUT", format!("submissions/{id}/items/{item_id}"));
        Ok(updated)
    }

    async fn remove_item(&self, id: SubmissionId, item_id: SubmittedItemId) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::EditItems)?;
        let before = list.items.len();
        list.items.retain(|item| item.id != item_id);
        if list.items.len() == before {
            return Err(ApiError::NotFound(format!("item {item_id} not found")));
        }
        state.record("DELETE", format!("submissions/{id}/items/{item_id}"));
        Ok(())
    }

    async fn convert_to_checklist(
        &self,
        id: SubmissionId,
        options: &ConvertOptions,
    ) -> Result<Checklist, ApiError> {
        let mut state = self.state.write().await;
        let list = state.guarded(id, Action::ConvertToChecklist)?;
        let items = snapshot_items(list, options);
        if items.is_empty() {
            return Err(validation("the list has no items to export"));
        }
        let name = options.checklist_name(list);
        let checklist = Checklist {
            id: ChecklistId::new(state.next_id()),
            name,
            source_submission_id: id,
            created_at: Utc::now(),
            items,
        };
        state.checklists.push(checklist.clone());
        state.record("POST", format!("submissions/{id}/convert-checklist"));
        Ok(checklist)
    }
}
