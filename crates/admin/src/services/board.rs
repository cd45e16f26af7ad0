//! Submissions board: the last good page of a view.
//!
//! A failed refresh keeps the rows already loaded and records a retryable
//! error next to them. Switching view drops the old rows so active and
//! archived lists never show together.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::SubmissionWorkflow;
use crate::api::SubmissionsApi;
use crate::models::listing;
use crate::models::{ListingQuery, SubmissionSummary, SubmissionView};

/// Error from the most recent refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadError {
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionBoard {
    view: SubmissionView,
    query: ListingQuery,
    loaded: Vec<SubmissionSummary>,
    loaded_at: Option<DateTime<Utc>>,
    last_error: Option<LoadError>,
}

impl SubmissionBoard {
    #[must_use]
    pub fn new(view: SubmissionView, query: ListingQuery) -> Self {
        Self {
            view,
            query,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn view(&self) -> SubmissionView {
        self.view
    }

    /// Switch view. Rows of the previous view are dropped.
    pub fn set_view(&mut self, view: SubmissionView) {
        if view != self.view {
            self.view = view;
            self.loaded.clear();
            self.loaded_at = None;
            self.last_error = None;
        }
    }

    /// Change search or sort; applied to the loaded rows without reloading.
    pub fn set_query(&mut self, query: ListingQuery) {
        self.query = query;
    }

    /// Loaded rows with the current search and sort applied.
    #[must_use]
    pub fn rows(&self) -> Vec<SubmissionSummary> {
        listing::apply(&self.loaded, &self.query)
    }

    /// When the rows were last loaded successfully.
    #[must_use]
    pub const fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Reload the current view. Returns `true` if the rows are fresh.
    pub async fn refresh<A: SubmissionsApi>(&mut self, workflow: &SubmissionWorkflow<A>) -> bool {
        match workflow.list(self.view, &ListingQuery::default()).await {
            Ok(rows) => {
                debug!(count = rows.len(), "Board refreshed");
                self.loaded = rows;
                self.loaded_at = Some(Utc::now());
                self.last_error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, kept = self.loaded.len(), "Board refresh failed, keeping last rows");
                self.last_error = Some(LoadError {
                    message: err.user_message(),
                    retryable: err.is_retryable(),
                });
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pantry_core::{ListKind, SubmissionId, SubmissionStatus};

    use super::*;
    use crate::api::{FailureTarget, InMemoryBackOffice};
    use crate::models::submission::tests::list;
    use crate::services::ServiceSettings;

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_rows() {
        let backend = InMemoryBackOffice::new();
        backend
            .insert_submission(list(ListKind::Quick, SubmissionStatus::Pendente))
            .await;
        let workflow = SubmissionWorkflow::new(backend.clone(), ServiceSettings::default());
        let mut board = SubmissionBoard::default();

        assert!(board.refresh(&workflow).await);
        assert_eq!(board.rows().len(), 1);

        backend
            .fail(FailureTarget::SubmissionListing, 503, "fora do ar")
            .await;
        assert!(!board.refresh(&workflow).await);
        assert_eq!(board.rows().len(), 1);
        let err = board.last_error().unwrap();
        assert_eq!(err.message, "fora do ar");
        assert!(err.retryable);

        backend.clear_failures().await;
        assert!(board.refresh(&workflow).await);
        assert!(board.last_error().is_none());
    }

    #[tokio::test]
    async fn test_switching_view_drops_rows() {
        let backend = InMemoryBackOffice::new();
        backend
            .insert_submission(list(ListKind::Quick, SubmissionStatus::Pendente))
            .await;
        let workflow = SubmissionWorkflow::new(backend, ServiceSettings::default());
        let mut board = SubmissionBoard::default();
        board.refresh(&workflow).await;

        board.set_view(SubmissionView::Archived);
        assert!(board.rows().is_empty());
        assert!(board.loaded_at().is_none());
        board.refresh(&workflow).await;
        assert!(board.rows().is_empty());
    }

    #[tokio::test]
    async fn test_query_applies_without_reload() {
        let backend = InMemoryBackOffice::new();
        let mut other = list(ListKind::Quick, SubmissionStatus::Pendente);
        other.id = SubmissionId::new(2);
        other.name = "Bar".to_string();
        backend
            .insert_submission(list(ListKind::Quick, SubmissionStatus::Pendente))
            .await;
        backend.insert_submission(other).await;
        let workflow = SubmissionWorkflow::new(backend, ServiceSettings::default());
        let mut board = SubmissionBoard::default();
        board.refresh(&workflow).await;

        board.set_query(ListingQuery {
            search: Some("bar".to_string()),
            ..ListingQuery::default()
        });
        let rows = board.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, SubmissionId::new(2));
    }
}
