//! Submission approval workflow.
//!
//! Every transition loads the list, checks it against the lifecycle rules in
//! [`SubmittedList::check`] and only then calls the API, so an invalid
//! transition is reported without a write. The server enforces the same
//! rules; a list that changed in between comes back as a conflict.

use std::future::Future;

use pantry_core::{ListKind, SubmissionId, SubmittedItemId};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::ServiceSettings;
use super::batch::{self, BatchReport};
use crate::api::SubmissionsApi;
use crate::error::AppError;
use crate::models::checklist::snapshot_items;
use crate::models::listing;
use crate::models::{
    Action, Checklist, ConvertOptions, ListingQuery, NewSubmittedItem, SubmissionSummary,
    SubmissionView, SubmittedItem, SubmittedItemPatch, SubmittedList, TransitionError,
};

/// Result of [`SubmissionWorkflow::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "list")]
pub enum SubmitOutcome {
    /// The list is now pending review.
    Submitted(SubmittedList),
    /// Nothing to submit; the list stays a draft.
    StillDraft(SubmittedList),
}

fn reason(admin_message: &str) -> Result<&str, AppError> {
    let trimmed = admin_message.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "a reason is required to reject a list".to_string(),
        ));
    }
    Ok(trimmed)
}

fn optional_message(admin_message: Option<&str>) -> Option<&str> {
    admin_message.map(str::trim).filter(|m| !m.is_empty())
}

/// Lifecycle transitions, item edits, checklist export and bulk actions for
/// submitted lists.
#[derive(Debug, Clone)]
pub struct SubmissionWorkflow<A> {
    api: A,
    settings: ServiceSettings,
}

impl<A: SubmissionsApi> SubmissionWorkflow<A> {
    /// Create a new workflow over `api`.
    #[must_use]
    pub const fn new(api: A, settings: ServiceSettings) -> Self {
        Self { api, settings }
    }

    async fn load_checked(&self, id: SubmissionId, action: Action) -> Result<SubmittedList, AppError> {
        let list = self.api.get_submission(id).await?;
        list.check(action)?;
        Ok(list)
    }

    /// Rows of `view`, searched and sorted by `query`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        view: SubmissionView,
        query: &ListingQuery,
    ) -> Result<Vec<SubmissionSummary>, AppError> {
        let rows = self.api.list_submissions(view).await?;
        Ok(listing::apply(&rows, query))
    }

    /// Load one list with its items.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: SubmissionId) -> Result<SubmittedList, AppError> {
        Ok(self.api.get_submission(id).await?)
    }

    /// Submit a quick-list draft for review.
    ///
    /// A draft without active items is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is not a draft quick list,
    /// or an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn submit(&self, id: SubmissionId) -> Result<SubmitOutcome, AppError> {
        let list = self.api.get_submission(id).await?;
        match list.check(Action::Submit) {
            Err(TransitionError::NothingToSubmit) => {
                info!(submission_id = %id, "Draft has no items, left as draft");
                return Ok(SubmitOutcome::StillDraft(list));
            }
            result => result?,
        }
        let submitted = self.api.submit(id).await?;
        info!(submission_id = %id, "Submitted list");
        Ok(SubmitOutcome::Submitted(submitted))
    }

    /// Approve a pending list. A blank message counts as none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is archived or not pending.
    #[instrument(skip(self, admin_message))]
    pub async fn approve(
        &self,
        id: SubmissionId,
        admin_message: Option<&str>,
    ) -> Result<SubmittedList, AppError> {
        self.load_checked(id, Action::Approve).await?;
        let list = self.api.approve(id, optional_message(admin_message)).await?;
        info!(submission_id = %id, status = %list.status, "Approved list");
        Ok(list)
    }

    /// Reject a pending list with a mandatory reason.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank reason (nothing is sent),
    /// or [`AppError::Conflict`] if the list is archived or not pending.
    #[instrument(skip(self, admin_message))]
    pub async fn reject(&self, id: SubmissionId, admin_message: &str) -> Result<SubmittedList, AppError> {
        let admin_message = reason(admin_message)?;
        self.reject_checked(id, admin_message).await
    }

    async fn reject_checked(&self, id: SubmissionId, admin_message: &str) -> Result<SubmittedList, AppError> {
        self.load_checked(id, Action::Reject).await?;
        let list = self.api.reject(id, admin_message).await?;
        info!(submission_id = %id, status = %list.status, "Rejected list");
        Ok(list)
    }

    /// Undo a decision: back to pending, message cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is archived or undecided.
    #[instrument(skip(self))]
    pub async fn revert(&self, id: SubmissionId) -> Result<SubmittedList, AppError> {
        self.load_checked(id, Action::Revert).await?;
        let list = self.api.revert(id).await?;
        info!(submission_id = %id, "Reverted list to pending");
        Ok(list)
    }

    /// Archive a list. Allowed from any status; the status is kept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is already archived.
    #[instrument(skip(self))]
    pub async fn archive(&self, id: SubmissionId) -> Result<SubmittedList, AppError> {
        self.load_checked(id, Action::Archive).await?;
        let list = self.api.archive(id).await?;
        info!(submission_id = %id, status = %list.status, "Archived list");
        Ok(list)
    }

    /// Bring an archived list back to the active view.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is not archived.
    #[instrument(skip(self))]
    pub async fn unarchive(&self, id: SubmissionId) -> Result<SubmittedList, AppError> {
        self.load_checked(id, Action::Unarchive).await?;
        let list = self.api.unarchive(id).await?;
        info!(submission_id = %id, "Unarchived list");
        Ok(list)
    }

    /// Delete an archived list and its items. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is not archived.
    #[instrument(skip(self))]
    pub async fn permanently_delete(&self, id: SubmissionId) -> Result<(), AppError> {
        self.load_checked(id, Action::Delete).await?;
        self.api.delete_submission(id).await?;
        info!(submission_id = %id, "Permanently deleted list");
        Ok(())
    }

    /// Mark a quick-list item as resolved without purchase.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] for traditional or archived lists, or
    /// an item that is already discarded.
    pub async fn discard_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
    ) -> Result<SubmittedItem, AppError> {
        self.set_discarded(id, item_id, true).await
    }

    /// Undo [`Self::discard_item`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the item is not discarded.
    pub async fn restore_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
    ) -> Result<SubmittedItem, AppError> {
        self.set_discarded(id, item_id, false).await
    }

    #[instrument(skip(self))]
    async fn set_discarded(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        discard: bool,
    ) -> Result<SubmittedItem, AppError> {
        let list = self.load_checked(id, Action::ToggleDiscard).await?;
        let item = list
            .item(item_id)
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} not found")))?;
        item.check_discard(discard)?;
        let item = self.api.set_item_discarded(id, item_id, discard).await?;
        info!(submission_id = %id, %item_id, discarded = discard, "Updated discard flag");
        Ok(item)
    }

    /// Add lines to an editable list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty request or a blank item
    /// name, or [`AppError::Conflict`] if the list is not editable.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn add_items(
        &self,
        id: SubmissionId,
        items: &[NewSubmittedItem],
    ) -> Result<SubmittedList, AppError> {
        if items.is_empty() {
            return Err(AppError::Validation("no items to add".to_string()));
        }
        if items.iter().any(|item| item.item_name.trim().is_empty()) {
            return Err(AppError::Validation("item name cannot be empty".to_string()));
        }
        self.load_checked(id, Action::EditItems).await?;
        let list = self.api.add_items(id, items).await?;
        info!(submission_id = %id, added = items.len(), "Added items");
        Ok(list)
    }

    /// Edit a line of an editable list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is not editable or a line
    /// decision is set on a quick list.
    #[instrument(skip(self, patch))]
    pub async fn update_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        patch: &SubmittedItemPatch,
    ) -> Result<SubmittedItem, AppError> {
        let list = self.load_checked(id, Action::EditItems).await?;
        if patch.order_status.is_some() && list.kind != ListKind::Traditional {
            return Err(TransitionError::WrongKind {
                action: Action::EditItems,
                kind: list.kind,
            }
            .into());
        }
        let item = self.api.update_submitted_item(id, item_id, patch).await?;
        debug!(submission_id = %id, %item_id, "Updated submitted item");
        Ok(item)
    }

    /// Remove a line from an editable list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the list is not editable.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: SubmissionId, item_id: SubmittedItemId) -> Result<(), AppError> {
        self.load_checked(id, Action::EditItems).await?;
        self.api.remove_item(id, item_id).await?;
        info!(submission_id = %id, %item_id, "Removed item");
        Ok(())
    }

    /// Snapshot the eligible lines of a decided list into a new checklist.
    ///
    /// The source list is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] unless the list is approved or partially
    /// approved, or [`AppError::Validation`] if no line is eligible.
    #[instrument(skip(self, options))]
    pub async fn convert_to_checklist(
        &self,
        id: SubmissionId,
        options: &ConvertOptions,
    ) -> Result<Checklist, AppError> {
        let list = self.load_checked(id, Action::ConvertToChecklist).await?;
        if snapshot_items(&list, options).is_empty() {
            return Err(AppError::Validation(
                "the list has no items to export".to_string(),
            ));
        }
        let checklist = self.api.convert_to_checklist(id, options).await?;
        info!(
            submission_id = %id,
            checklist_id = %checklist.id,
            items = checklist.items.len(),
            "Converted list to checklist"
        );
        Ok(checklist)
    }

    /// Approve many lists, best effort.
    pub async fn approve_many<C>(
        &self,
        ids: &[SubmissionId],
        admin_message: Option<&str>,
        cancel: C,
    ) -> BatchReport<SubmissionId>
    where
        C: Future<Output = ()>,
    {
        let message = optional_message(admin_message);
        self.for_each(ids, cancel, |id| async move { self.approve(id, message).await })
            .await
    }

    /// Reject many lists with one shared reason, best effort.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank reason; no list is touched.
    pub async fn reject_many<C>(
        &self,
        ids: &[SubmissionId],
        admin_message: &str,
        cancel: C,
    ) -> Result<BatchReport<SubmissionId>, AppError>
    where
        C: Future<Output = ()>,
    {
        let message = reason(admin_message)?;
        Ok(self
            .for_each(ids, cancel, |id| async move {
                self.reject_checked(id, message).await
            })
            .await)
    }

    /// Archive many lists, best effort.
    pub async fn archive_many<C>(&self, ids: &[SubmissionId], cancel: C) -> BatchReport<SubmissionId>
    where
        C: Future<Output = ()>,
    {
        self.for_each(ids, cancel, |id| self.archive(id)).await
    }

    /// Unarchive many lists, best effort.
    pub async fn unarchive_many<C>(&self, ids: &[SubmissionId], cancel: C) -> BatchReport<SubmissionId>
    where
        C: Future<Output = ()>,
    {
        self.for_each(ids, cancel, |id| self.unarchive(id)).await
    }

    /// Permanently delete many archived lists, best effort.
    pub async fn delete_many<C>(&self, ids: &[SubmissionId], cancel: C) -> BatchReport<SubmissionId>
    where
        C: Future<Output = ()>,
    {
        batch::run(ids.iter().copied(), self.settings.concurrency, cancel, |id| async move {
            self.permanently_delete(id).await.map(|()| id)
        })
        .await
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn for_each<C, F, Fut>(
        &self,
        ids: &[SubmissionId],
        cancel: C,
        op: F,
    ) -> BatchReport<SubmissionId>
    where
        C: Future<Output = ()>,
        F: Fn(SubmissionId) -> Fut,
        Fut: Future<Output = Result<SubmittedList, AppError>>,
    {
        batch::run(ids.iter().copied(), self.settings.concurrency, cancel, op)
            .await
            .map(|list| list.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::pending;

    use pantry_core::{OrderStatus, SubmissionStatus, Unit};

    use super::*;
    use crate::api::InMemoryBackOffice;
    use crate::models::submission::tests::{item, list};

    fn seeded(id: i64, kind: ListKind, status: SubmissionStatus) -> SubmittedList {
        let mut l = list(kind, status);
        l.id = SubmissionId::new(id);
        l
    }

    async fn workflow_with(lists: Vec<SubmittedList>) -> (InMemoryBackOffice, SubmissionWorkflow<InMemoryBackOffice>) {
        let backend = InMemoryBackOffice::new();
        for l in lists {
            backend.insert_submission(l).await;
        }
        let workflow = SubmissionWorkflow::new(backend.clone(), ServiceSettings::default());
        (backend, workflow)
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let (backend, workflow) =
            workflow_with(vec![seeded(1, ListKind::Quick, SubmissionStatus::Pendente)]).await;
        let id = SubmissionId::new(1);

        assert!(matches!(
            workflow.reject(id, "").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            workflow.reject(id, "   ").await,
            Err(AppError::Validation(_))
        ));
        assert!(backend.writes().await.is_empty());

        let rejected = workflow.reject(id, "estoque suficiente").await.unwrap();
        assert_eq!(rejected.status, SubmissionStatus::Rejeitado);
        assert_eq!(rejected.admin_message.as_deref(), Some("estoque suficiente"));

        // Rejecting twice is a conflict, not a no-op
        assert!(matches!(
            workflow.reject(id, "de novo").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_blank_message_is_none() {
        let (_, workflow) =
            workflow_with(vec![seeded(1, ListKind::Quick, SubmissionStatus::Pendente)]).await;
        let approved = workflow.approve(SubmissionId::new(1), Some("  ")).await.unwrap();
        assert_eq!(approved.status, SubmissionStatus::Aprovado);
        assert_eq!(approved.admin_message, None);
    }

    #[tokio::test]
    async fn test_archive_unarchive_preserves_status() {
        let (_, workflow) =
            workflow_with(vec![seeded(1, ListKind::Traditional, SubmissionStatus::Rejeitado)]).await;
        let id = SubmissionId::new(1);

        let archived = workflow.archive(id).await.unwrap();
        assert!(archived.archived);
        assert_eq!(archived.status, SubmissionStatus::Rejeitado);
        assert!(matches!(workflow.archive(id).await, Err(AppError::Conflict(_))));
        assert!(matches!(workflow.revert(id).await, Err(AppError::Conflict(_))));

        let restored = workflow.unarchive(id).await.unwrap();
        assert!(!restored.archived);
        assert_eq!(restored.status, SubmissionStatus::Rejeitado);
    }

    #[tokio::test]
    async fn test_pending_lists_can_be_archived() {
        let (_, workflow) =
            workflow_with(vec![seeded(1, ListKind::Quick, SubmissionStatus::Pendente)]).await;
        let archived = workflow.archive(SubmissionId::new(1)).await.unwrap();
        assert_eq!(archived.status, SubmissionStatus::Pendente);
    }

    #[tokio::test]
    async fn test_delete_requires_archived() {
        let (backend, workflow) =
            workflow_with(vec![seeded(1, ListKind::Quick, SubmissionStatus::Aprovado)]).await;
        let id = SubmissionId::new(1);

        assert!(matches!(
            workflow.permanently_delete(id).await,
            Err(AppError::Conflict(_))
        ));
        workflow.archive(id).await.unwrap();
        workflow.permanently_delete(id).await.unwrap();
        assert!(backend.submission_snapshot(id).await.is_none());
        assert!(matches!(workflow.get(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_revert_clears_decision() {
        let (_, workflow) =
            workflow_with(vec![seeded(1, ListKind::Traditional, SubmissionStatus::Pendente)]).await;
        let id = SubmissionId::new(1);
        let approved = workflow.approve(id, Some("ok")).await.unwrap();
        assert_eq!(approved.status, SubmissionStatus::Aprovado);

        let reverted = workflow.revert(id).await.unwrap();
        assert_eq!(reverted.status, SubmissionStatus::Pendente);
        assert_eq!(reverted.admin_message, None);
        assert!(matches!(workflow.revert(id).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_empty_draft_stays_draft() {
        let mut draft = seeded(1, ListKind::Quick, SubmissionStatus::Rascunho);
        draft.items.clear();
        let (backend, workflow) = workflow_with(vec![draft]).await;

        let outcome = workflow.submit(SubmissionId::new(1)).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::StillDraft(ref l) if l.status == SubmissionStatus::Rascunho));
        assert!(backend.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_draft_and_reject_resubmit() {
        let (_, workflow) =
            workflow_with(vec![seeded(1, ListKind::Quick, SubmissionStatus::Rascunho)]).await;
        let id = SubmissionId::new(1);

        let outcome = workflow.submit(id).await.unwrap();
        let SubmitOutcome::Submitted(submitted) = outcome else {
            panic!("expected the list to be submitted");
        };
        assert_eq!(submitted.status, SubmissionStatus::Pendente);
        assert!(submitted.submitted_at.is_some());

        assert!(matches!(workflow.submit(id).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_quick_list_discard_then_checklist() {
        let mut quick = seeded(1, ListKind::Quick, SubmissionStatus::Rascunho);
        quick.items.push(item(3, "Sal"));
        let (backend, workflow) = workflow_with(vec![quick]).await;
        let id = SubmissionId::new(1);

        workflow.discard_item(id, SubmittedItemId::new(2)).await.unwrap();
        assert!(matches!(
            workflow.discard_item(id, SubmittedItemId::new(2)).await,
            Err(AppError::Conflict(_))
        ));

        workflow.submit(id).await.unwrap();
        let approved = workflow.approve(id, None).await.unwrap();
        assert_eq!(approved.status, SubmissionStatus::Aprovado);

        let checklist = workflow
            .convert_to_checklist(id, &ConvertOptions::default())
            .await
            .unwrap();
        let names: Vec<&str> = checklist.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Arroz", "Sal"]);
        assert_eq!(checklist.name, "Checklist - Cozinha");

        // Source list untouched
        let source = backend.submission_snapshot(id).await.unwrap();
        assert_eq!(source.items.len(), 3);
        assert_eq!(source.status, SubmissionStatus::Aprovado);
    }

    #[tokio::test]
    async fn test_checklist_requires_decided_list_with_items() {
        let mut all_discarded = seeded(2, ListKind::Quick, SubmissionStatus::Aprovado);
        for line in &mut all_discarded.items {
            line.discarded = true;
        }
        let (_, workflow) = workflow_with(vec![
            seeded(1, ListKind::Quick, SubmissionStatus::Pendente),
            all_discarded,
        ])
        .await;

        assert!(matches!(
            workflow
                .convert_to_checklist(SubmissionId::new(1), &ConvertOptions::default())
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            workflow
                .convert_to_checklist(SubmissionId::new(2), &ConvertOptions::default())
                .await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_discard_not_allowed_on_traditional_lists() {
        let (_, workflow) =
            workflow_with(vec![seeded(1, ListKind::Traditional, SubmissionStatus::Aprovado)]).await;
        assert!(matches!(
            workflow
                .discard_item(SubmissionId::new(1), SubmittedItemId::new(1))
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_item_edits_only_while_editable() {
        let (_, workflow) = workflow_with(vec![
            seeded(1, ListKind::Quick, SubmissionStatus::Pendente),
            seeded(2, ListKind::Quick, SubmissionStatus::Aprovado),
        ])
        .await;

        let updated = workflow
            .add_items(
                SubmissionId::new(1),
                &[NewSubmittedItem::temporary("Guardanapo", Unit::Package)],
            )
            .await
            .unwrap();
        assert_eq!(updated.items.len(), 3);
        assert!(updated.items[2].is_temporary());

        workflow
            .remove_item(SubmissionId::new(1), SubmittedItemId::new(1))
            .await
            .unwrap();

        assert!(matches!(
            workflow
                .add_items(
                    SubmissionId::new(2),
                    &[NewSubmittedItem::temporary("Guardanapo", Unit::Package)]
                )
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            workflow.add_items(SubmissionId::new(1), &[]).await,
            Err(AppError::Validation(_))
        ));

        let line_decision = SubmittedItemPatch {
            order_status: Some(OrderStatus::Aprovado),
            ..SubmittedItemPatch::default()
        };
        assert!(matches!(
            workflow
                .update_item(SubmissionId::new(1), SubmittedItemId::new(2), &line_decision)
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_approve_continues_past_archived_member() {
        let mut lists: Vec<SubmittedList> = (1..=5)
            .map(|id| seeded(id, ListKind::Quick, SubmissionStatus::Pendente))
            .collect();
        lists[2].archived = true;
        let (_, workflow) = workflow_with(lists).await;
        let ids: Vec<SubmissionId> = (1..=5).map(SubmissionId::new).collect();

        let report = workflow.approve_many(&ids, None, pending()).await;
        assert_eq!(report.succeeded.len(), 4);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, SubmissionId::new(3));
        assert!(!report.failed[0].retryable);
        assert_eq!(report.summary("approved"), "4 approved, 1 could not be approved");
    }

    #[tokio::test]
    async fn test_bulk_reject_validates_reason_once() {
        let (backend, workflow) =
            workflow_with(vec![seeded(1, ListKind::Quick, SubmissionStatus::Pendente)]).await;
        assert!(matches!(
            workflow
                .reject_many(&[SubmissionId::new(1)], " ", pending())
                .await,
            Err(AppError::Validation(_))
        ));
        assert!(backend.writes().await.is_empty());

        let report = workflow
            .reject_many(&[SubmissionId::new(1)], "sem verba", pending())
            .await
            .unwrap();
        assert!(report.is_complete_success());
    }

    #[tokio::test]
    async fn test_bulk_archive_then_delete() {
        let (backend, workflow) = workflow_with(vec![
            seeded(1, ListKind::Quick, SubmissionStatus::Aprovado),
            seeded(2, ListKind::Traditional, SubmissionStatus::Rejeitado),
        ])
        .await;
        let ids = [SubmissionId::new(1), SubmissionId::new(2)];

        let deleted = workflow.delete_many(&ids, pending()).await;
        assert_eq!(deleted.failed.len(), 2);

        assert!(workflow.archive_many(&ids, pending()).await.is_complete_success());
        let unarchived = workflow.unarchive_many(&ids[..1], pending()).await;
        assert_eq!(unarchived.succeeded, vec![SubmissionId::new(1)]);

        let deleted = workflow.delete_many(&ids, pending()).await;
        assert_eq!(deleted.succeeded, vec![SubmissionId::new(2)]);
        assert_eq!(deleted.failed[0].id, SubmissionId::new(1));
        assert!(backend.submission_snapshot(SubmissionId::new(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_list_views() {
        let mut archived = seeded(3, ListKind::Quick, SubmissionStatus::Aprovado);
        archived.archived = true;
        let (_, workflow) = workflow_with(vec![
            seeded(1, ListKind::Quick, SubmissionStatus::Pendente),
            seeded(2, ListKind::Quick, SubmissionStatus::Aprovado),
            archived,
        ])
        .await;
        let query = ListingQuery::default();

        let pending_rows = workflow.list(SubmissionView::default(), &query).await.unwrap();
        assert_eq!(pending_rows.len(), 1);
        let active = workflow.list(SubmissionView::Active(None), &query).await.unwrap();
        assert_eq!(active.len(), 2);
        let archived_rows = workflow.list(SubmissionView::Archived, &query).await.unwrap();
        assert_eq!(archived_rows[0].id, SubmissionId::new(3));
    }
}
