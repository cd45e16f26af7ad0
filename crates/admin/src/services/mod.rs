//! Business logic services for the back-office.
//!
//! # Services
//!
//! - `replenishment` - Reorder decisions, thresholds, supplier assignment, item transfer
//! - `submissions` - Approval workflow for traditional and quick lists
//! - `board` - Last good page of the submissions table
//! - `batch` - Best-effort bulk runner shared by both

pub mod batch;
pub mod board;
pub mod replenishment;
pub mod submissions;

pub use batch::{BatchFailure, BatchReport};
pub use board::{LoadError, SubmissionBoard};
pub use replenishment::{
    AssignmentReport, ItemEdit, ReorderedItem, ReplenishmentEngine, ThresholdReport,
    TransferReport, compute_reorder_quantity, filter_active_items, shortfall_label,
};
pub use submissions::{SubmissionWorkflow, SubmitOutcome};

use crate::config::AdminConfig;

/// Tuning shared by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Requests in flight per bulk operation.
    pub concurrency: usize,
    /// Generate an idempotency key for supplier assignments that lack one.
    pub idempotent_assign: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            concurrency: batch::DEFAULT_CONCURRENCY,
            idempotent_assign: false,
        }
    }
}

impl From<&AdminConfig> for ServiceSettings {
    fn from(config: &AdminConfig) -> Self {
        Self {
            concurrency: config.bulk_concurrency,
            idempotent_assign: config.idempotent_assign,
        }
    }
}
