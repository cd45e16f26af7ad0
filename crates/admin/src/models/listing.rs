//! Submissions table: views, search and sorting.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use pantry_core::SubmissionStatus;
use pantry_core::text::{contains_folded, locale_cmp};
use serde::{Deserialize, Serialize};

use super::submission::SubmissionSummary;

/// Which lists the table shows. Active and archived lists are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "view", content = "status")]
pub enum SubmissionView {
    /// Non-archived lists, optionally restricted to one status.
    Active(Option<SubmissionStatus>),
    Archived,
}

impl Default for SubmissionView {
    fn default() -> Self {
        Self::Active(Some(SubmissionStatus::Pendente))
    }
}

impl SubmissionView {
    /// Query parameters for `GET /submissions`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Active(Some(status)) => vec![
                ("status", status.to_string()),
                ("archived", "false".to_string()),
            ],
            Self::Active(None) => vec![("archived", "false".to_string())],
            Self::Archived => vec![("archived", "true".to_string())],
        }
    }

    /// Returns `true` if a row belongs in this view.
    #[must_use]
    pub fn includes(&self, row: &SubmissionSummary) -> bool {
        match self {
            Self::Active(status) => !row.archived && status.is_none_or(|s| s == row.status),
            Self::Archived => row.archived,
        }
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Name,
    Submitter,
    #[default]
    Date,
    Status,
    ItemCount,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "submitter" => Ok(Self::Submitter),
            "date" => Ok(Self::Date),
            "status" => Ok(Self::Status),
            "items" | "item_count" => Ok(Self::ItemCount),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Search and sort applied to a loaded page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Free text matched against name, submitter, date and status label.
    pub search: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
}

/// Date as shown in the table (`dd/mm/yyyy HH:MM`, UTC).
#[must_use]
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

/// Returns `true` if `row` matches the free-text `term`.
#[must_use]
pub fn matches_search(row: &SubmissionSummary, term: &str) -> bool {
    contains_folded(&row.name, term)
        || contains_folded(&row.owner.name, term)
        || contains_folded(&format_date(row.listed_at()), term)
        || contains_folded(row.status.label(), term)
}

/// Compare two rows by `key`, breaking ties by id.
#[must_use]
pub fn compare(a: &SubmissionSummary, b: &SubmissionSummary, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Id => Ordering::Equal,
        SortKey::Name => locale_cmp(&a.name, &b.name),
        SortKey::Submitter => locale_cmp(&a.owner.name, &b.owner.name),
        SortKey::Date => a.listed_at().cmp(&b.listed_at()),
        SortKey::Status => a.status.severity().cmp(&b.status.severity()),
        SortKey::ItemCount => a.item_count.cmp(&b.item_count),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Apply search and sort to a page of rows.
#[must_use]
pub fn apply(rows: &[SubmissionSummary], query: &ListingQuery) -> Vec<SubmissionSummary> {
    let term = query.search.as_deref().unwrap_or_default();
    let mut out: Vec<SubmissionSummary> = rows
        .iter()
        .filter(|row| matches_search(row, term))
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        let ord = compare(a, b, query.sort);
        match query.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}
