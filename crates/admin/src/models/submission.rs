//! Submitted lists, their items, and the lifecycle rules they follow.
//!
//! A list has two independent axes: its [`SubmissionStatus`] and an
//! `archived` flag. Archiving never touches the status, so an archived list
//! still says whether it was approved or rejected.
//!
//! ```text
//! RASCUNHO ──submit──▶ PENDENTE ──approve──▶ APROVADO
//!  (quick)                │  ▲   ──reject───▶ REJEITADO
//!                         │  └───revert───── PARCIALMENTE_APROVADO (traditional)
//!                         ▼
//!              archive / unarchive (any status)  ──▶ delete (archived only)
//! ```

use chrono::{DateTime, Utc};
use pantry_core::{
    ItemRef, ListKind, OrderStatus, Priority, Quantity, SubmissionId, SubmissionStatus,
    SubmittedItemId, Unit, UserId,
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Who submitted a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: UserId,
    pub name: String,
}

/// A line item of a submitted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedItem {
    /// Unique item ID within the submission.
    pub id: SubmittedItemId,
    /// Catalog, supplier or temporary reference.
    #[serde(rename = "ref", deserialize_with = "item_ref_or_legacy")]
    pub item_ref: ItemRef,
    /// Display name.
    pub item_name: String,
    /// Unit of measure.
    pub unit: Unit,
    /// Quantity asked for, if the collaborator entered one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<Quantity>,
    /// Quick lists only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Free-text note from the collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    /// Resolved without purchase.
    #[serde(default)]
    pub discarded: bool,
    /// Proposed as a permanent catalog item, pending admin review.
    #[serde(default)]
    pub suggested_for_catalog: bool,
    /// Supplier name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Traditional lists only: the per-line decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
}

impl SubmittedItem {
    /// Returns `true` for items that only exist inside this list.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        self.item_ref.is_temporary()
    }

    /// Check that the discard flag can be set to `discard`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the item is already in that state.
    pub const fn check_discard(&self, discard: bool) -> Result<(), TransitionError> {
        match (discard, self.discarded) {
            (true, true) => Err(TransitionError::AlreadyDiscarded),
            (false, false) => Err(TransitionError::NotDiscarded),
            _ => Ok(()),
        }
    }
}

/// A traditional or quick list going through approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedList {
    pub id: SubmissionId,
    pub kind: ListKind,
    pub name: String,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    /// Absent while the list is a draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub archived: bool,
    /// Note recorded by the administrator on approval or rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
    #[serde(default)]
    pub items: Vec<SubmittedItem>,
}

/// Lifecycle operations guarded by [`SubmittedList::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Submit,
    Approve,
    Reject,
    Revert,
    Archive,
    Unarchive,
    Delete,
    EditItems,
    ToggleDiscard,
    ConvertToChecklist,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Revert => "revert",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Delete => "delete",
            Self::EditItems => "edit items of",
            Self::ToggleDiscard => "discard or restore items of",
            Self::ConvertToChecklist => "convert to checklist",
        };
        f.write_str(name)
    }
}

/// A lifecycle operation that is not valid for the list's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} an archived list")]
    Archived { action: Action },

    #[error("cannot {action} a list that is not archived")]
    NotArchived { action: Action },

    #[error("list is already archived")]
    AlreadyArchived,

    #[error("cannot {action} a list with status {status}")]
    InvalidState {
        action: Action,
        status: SubmissionStatus,
    },

    #[error("cannot {action} a {kind} list")]
    WrongKind { action: Action, kind: ListKind },

    #[error("list has no items to submit")]
    NothingToSubmit,

    #[error("item is already discarded")]
    AlreadyDiscarded,

    #[error("item is not discarded")]
    NotDiscarded,
}

impl SubmittedList {
    /// Items that were not discarded.
    pub fn active_items(&self) -> impl Iterator<Item = &SubmittedItem> {
        self.items.iter().filter(|item| !item.discarded)
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn item(&self, id: SubmittedItemId) -> Option<&SubmittedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items can be added, edited or removed.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !self.archived
            && matches!(
                self.status,
                SubmissionStatus::Rascunho | SubmissionStatus::Pendente
            )
    }

    /// Status a traditional list takes from its per-line decisions.
    ///
    /// Discarded lines do not take part. Lines without a decision count as
    /// pending.
    #[must_use]
    pub fn derived_status(&self) -> SubmissionStatus {
        SubmissionStatus::from_order_statuses(
            self.active_items()
                .map(|item| item.order_status.unwrap_or_default()),
        )
    }

    /// Check whether `action` is allowed in the current state.
    ///
    /// # Errors
    ///
    /// Returns the [`TransitionError`] describing why the action is refused.
    pub fn check(&self, action: Action) -> Result<(), TransitionError> {
        match action {
            Action::Submit => {
                self.require_kind(action, ListKind::Quick)?;
                self.require_not_archived(action)?;
                self.require_status(action, &[SubmissionStatus::Rascunho])?;
                if self.active_items().next().is_none() {
                    return Err(TransitionError::NothingToSubmit);
                }
                Ok(())
            }
            Action::Approve | Action::Reject => {
                self.require_not_archived(action)?;
                self.require_status(action, &[SubmissionStatus::Pendente])
            }
            Action::Revert => {
                self.require_not_archived(action)?;
                self.require_status(
                    action,
                    &[
                        SubmissionStatus::Aprovado,
                        SubmissionStatus::Rejeitado,
                        SubmissionStatus::ParcialmenteAprovado,
                    ],
                )
            }
            Action::Archive => {
                if self.archived {
                    return Err(TransitionError::AlreadyArchived);
                }
                Ok(())
            }
            Action::Unarchive | Action::Delete => {
                if !self.archived {
                    return Err(TransitionError::NotArchived { action });
                }
                Ok(())
            }
            Action::EditItems => {
                self.require_not_archived(action)?;
                self.require_status(
                    action,
                    &[SubmissionStatus::Rascunho, SubmissionStatus::Pendente],
                )
            }
            Action::ToggleDiscard => {
                self.require_kind(action, ListKind::Quick)?;
                self.require_not_archived(action)
            }
            Action::ConvertToChecklist => self.require_status(
                action,
                &[
                    SubmissionStatus::Aprovado,
                    SubmissionStatus::ParcialmenteAprovado,
                ],
            ),
        }
    }

    /// Summary row for listings.
    #[must_use]
    pub fn summary(&self) -> SubmissionSummary {
        SubmissionSummary {
            id: self.id,
            kind: self.kind,
            name: self.name.clone(),
            owner: self.owner.clone(),
            created_at: self.created_at,
            submitted_at: self.submitted_at,
            status: self.status,
            archived: self.archived,
            item_count: self.items.len(),
        }
    }

    const fn require_not_archived(&self, action: Action) -> Result<(), TransitionError> {
        if self.archived {
            return Err(TransitionError::Archived { action });
        }
        Ok(())
    }

    fn require_status(
        &self,
        action: Action,
        allowed: &[SubmissionStatus],
    ) -> Result<(), TransitionError> {
        if allowed.contains(&self.status) && self.status.allowed_for(self.kind) {
            Ok(())
        } else {
            Err(TransitionError::InvalidState {
                action,
                status: self.status,
            })
        }
    }

    fn require_kind(&self, action: Action, kind: ListKind) -> Result<(), TransitionError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(TransitionError::WrongKind {
                action,
                kind: self.kind,
            })
        }
    }
}

/// A row of the submissions table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub id: SubmissionId,
    pub kind: ListKind,
    pub name: String,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub item_count: usize,
}

impl SubmissionSummary {
    /// Date shown in the table: submission time, or creation time for drafts.
    #[must_use]
    pub fn listed_at(&self) -> DateTime<Utc> {
        self.submitted_at.unwrap_or(self.created_at)
    }
}

/// A line to add to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmittedItem {
    #[serde(rename = "ref", deserialize_with = "item_ref_or_legacy")]
    pub item_ref: ItemRef,
    pub item_name: String,
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default)]
    pub suggested_for_catalog: bool,
}

impl NewSubmittedItem {
    /// A temporary item; its name and unit come from the reference.
    #[must_use]
    pub fn temporary(name: &str, unit: Unit) -> Self {
        Self {
            item_ref: ItemRef::temporary(name, unit),
            item_name: name.to_string(),
            unit,
            requested_quantity: None,
            priority: None,
            observation: None,
            suggested_for_catalog: false,
        }
    }
}

/// Wrapper for the add-items request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmittedItems {
    pub items: Vec<NewSubmittedItem>,
}

/// Partial update of a submitted item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Traditional lists only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
}

impl SubmittedItemPatch {
    /// Apply the patch to an item in place.
    pub fn apply_to(&self, item: &mut SubmittedItem) {
        if let Some(quantity) = self.requested_quantity {
            item.requested_quantity = Some(quantity);
        }
        if let Some(priority) = self.priority {
            item.priority = Some(priority);
        }
        if let Some(observation) = &self.observation {
            item.observation = Some(observation.clone());
        }
        if let Some(supplier) = &self.supplier {
            item.supplier = Some(supplier.clone());
        }
        if let Some(status) = self.order_status {
            item.order_status = Some(status);
        }
    }
}

/// Body of an approve request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
}

/// Body of a reject request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub admin_message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemRef {
    Typed(ItemRef),
    Legacy(String),
}

fn item_ref_or_legacy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ItemRef, D::Error> {
    match RawItemRef::deserialize(deserializer)? {
        RawItemRef::Typed(item_ref) => Ok(item_ref),
        RawItemRef::Legacy(raw) => ItemRef::parse_legacy(&raw).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use pantry_core::CatalogItemId;

    pub(crate) fn item(id: i64, name: &str) -> SubmittedItem {
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

    pub(crate) fn list(kind: ListKind, status: SubmissionStatus) -> SubmittedList {
        SubmittedList {
            id: SubmissionId::new(1),
            kind,
            name: "Cozinha".to_string(),
            owner: Owner {
                id: UserId::new(7),
                name: "Ana".to_string(),
            },
            created_at: DateTime::parse_from_rfc3339("2026-03-02T10:15:00Z")
                .unwrap()
                .with_timezone(&Utc),
            submitted_at: None,
            status,
            archived: false,
            admin_message: None,
            items: vec![item(1, "Arroz"), item(2, "Feijão")],
        }
    }

    #[test]
    fn test_status_outside_the_kind_blocks_lifecycle_actions() {
        let l = list(ListKind::Traditional, SubmissionStatus::Rascunho);
        assert_eq!(
            l.check(Action::EditItems),
            Err(TransitionError::InvalidState {
                action: Action::EditItems,
                status: SubmissionStatus::Rascunho,
            })
        );

        let l = list(ListKind::Quick, SubmissionStatus::ParcialmenteAprovado);
        assert!(matches!(
            l.check(Action::ConvertToChecklist),
            Err(TransitionError::InvalidState { .. })
        ));
        assert!(matches!(
            l.check(Action::Revert),
            Err(TransitionError::InvalidState { .. })
        ));
        assert!(l.check(Action::Archive).is_ok());
    }

    #[test]
    fn test_approve_requires_pending_and_active() {
        let mut l = list(ListKind::Quick, SubmissionStatus::Pendente);
        assert!(l.check(Action::Approve).is_ok());

        l.archived = true;
        assert_eq!(
            l.check(Action::Approve),
            Err(TransitionError::Archived {
                action: Action::Approve
            })
        );

        l.archived = false;
        l.status = SubmissionStatus::Rejeitado;
        assert!(matches!(
            l.check(Action::Reject),
            Err(TransitionError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_archive_allowed_from_any_status() {
        for status in [
            SubmissionStatus::Rascunho,
            SubmissionStatus::Pendente,
            SubmissionStatus::Aprovado,
            SubmissionStatus::Rejeitado,
        ] {
            let l = list(ListKind::Quick, status);
            assert!(l.check(Action::Archive).is_ok(), "{status}");
        }
    }

    #[test]
    fn test_delete_requires_archived() {
        let mut l = list(ListKind::Traditional, SubmissionStatus::Aprovado);
        assert!(matches!(
            l.check(Action::Delete),
            Err(TransitionError::NotArchived { .. })
        ));
        l.archived = true;
        assert!(l.check(Action::Delete).is_ok());
        assert_eq!(l.check(Action::Archive), Err(TransitionError::AlreadyArchived));
    }

    #[test]
    fn test_submit_rules() {
        let mut l = list(ListKind::Quick, SubmissionStatus::Rascunho);
        assert!(l.check(Action::Submit).is_ok());

        for item in &mut l.items {
            item.discarded = true;
        }
        assert_eq!(l.check(Action::Submit), Err(TransitionError::NothingToSubmit));

        let t = list(ListKind::Traditional, SubmissionStatus::Pendente);
        assert!(matches!(
            t.check(Action::Submit),
            Err(TransitionError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_revert_from_decided_states_only() {
        let l = list(ListKind::Traditional, SubmissionStatus::ParcialmenteAprovado);
        assert!(l.check(Action::Revert).is_ok());
        let p = list(ListKind::Traditional, SubmissionStatus::Pendente);
        assert!(p.check(Action::Revert).is_err());
    }

    #[test]
    fn test_editable_states() {
        assert!(list(ListKind::Quick, SubmissionStatus::Rascunho).is_editable());
        assert!(list(ListKind::Quick, SubmissionStatus::Pendente).is_editable());
        assert!(!list(ListKind::Quick, SubmissionStatus::Aprovado).is_editable());
    }

    #[test]
    fn test_discard_toggle_conflicts() {
        let mut it = item(1, "Arroz");
        assert!(it.check_discard(true).is_ok());
        assert_eq!(it.check_discard(false), Err(TransitionError::NotDiscarded));
        it.discarded = true;
        assert_eq!(it.check_discard(true), Err(TransitionError::AlreadyDiscarded));
    }

    #[test]
    fn test_derived_status_ignores_discarded_lines() {
        let mut l = list(ListKind::Traditional, SubmissionStatus::Pendente);
        l.items[0].order_status = Some(OrderStatus::Aprovado);
        l.items[1].order_status = Some(OrderStatus::Rejeitado);
        assert_eq!(l.derived_status(), SubmissionStatus::ParcialmenteAprovado);

        l.items[1].discarded = true;
        assert_eq!(l.derived_status(), SubmissionStatus::Aprovado);
    }

    #[test]
    fn test_item_ref_accepts_legacy_string() {
        let parsed: SubmittedItem = serde_json::from_str(
            r#"{"id":3,"ref":"fornecedor_45","itemName":"Queijo","unit":"kg"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.item_ref,
            ItemRef::SupplierItem {
                id: pantry_core::SupplierItemId::new(45)
            }
        );
        assert!(!parsed.is_temporary());
    }

    #[test]
    fn test_summary_counts_items() {
        let l = list(ListKind::Quick, SubmissionStatus::Pendente);
        let summary = l.summary();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.listed_at(), l.created_at);
    }
}
