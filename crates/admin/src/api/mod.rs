//! Back-office API seam.
//!
//! Persistence belongs to the external back-office API. Services talk to it
//! through two traits:
//!
//! - [`MasterListApi`] - master lists, stock items and purchase orders
//! - [`SubmissionsApi`] - submitted lists, their items and checklists
//!
//! [`PantryClient`] implements both over HTTP. [`InMemoryBackOffice`]
//! implements both in process, enforcing the same guards the server does.
//!
//! # API Reference
//!
//! - JSON bodies in camelCase
//! - Authentication: `Authorization: Bearer <token>`
//! - Errors: `{"error": "<message>"}`, shown to users verbatim

mod client;
mod memory;

pub use client::PantryClient;
pub use memory::{FailureTarget, InMemoryBackOffice};

use std::future::Future;

use pantry_core::{
    MasterListId, OrderStatus, PurchaseOrderId, Quantity, StockItemId, SubmissionId,
    SubmittedItemId,
};
use thiserror::Error;

use crate::models::{
    Checklist, ConvertOptions, ItemPatch, MasterList, NewMasterList, NewOrder, NewSubmittedItem,
    PurchaseOrderLine, StockItem, SubmissionSummary, SubmissionView, SubmittedItem,
    SubmittedItemPatch, SubmittedList, ThresholdConfig, TransferRequest,
};

/// Message used when the server gives no usable error text.
pub const DEFAULT_ERROR_MESSAGE: &str = "The request could not be completed. Please try again.";

/// Errors that can occur when talking to the back-office API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid or expired token).
    #[error("Unauthorized: invalid API token")]
    Unauthorized,
}

impl ApiError {
    /// Build an API error from a status code and server message.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` for failures worth retrying: transport errors, 429 and 5xx.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Parse(_) | Self::Unauthorized => false,
        }
    }

    /// Text to show a user: the server's message, or a generic default.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::NotFound(message) => message.clone(),
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs} seconds."),
            Self::Unauthorized => "Your session is not authorized for this operation.".to_string(),
            Self::Http(_) | Self::Parse(_) => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Master lists, stock items and purchase orders.
pub trait MasterListApi: Send + Sync {
    /// `GET /master-lists/{id}`
    fn get_master_list(
        &self,
        id: MasterListId,
    ) -> impl Future<Output = Result<MasterList, ApiError>> + Send;

    /// `POST /master-lists`
    fn create_master_list(
        &self,
        input: &NewMasterList,
    ) -> impl Future<Output = Result<MasterList, ApiError>> + Send;

    /// `PUT /master-lists/{id}/items/{itemId}`
    fn update_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        patch: &ItemPatch,
    ) -> impl Future<Output = Result<StockItem, ApiError>> + Send;

    /// `PUT /master-lists/{id}/items/{itemId}/config`
    fn update_item_config(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        config: &ThresholdConfig,
    ) -> impl Future<Output = Result<StockItem, ApiError>> + Send;

    /// `POST /master-lists/{id}/items/{itemId}/transfer`
    fn transfer_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        request: &TransferRequest,
    ) -> impl Future<Output = Result<StockItem, ApiError>> + Send;

    /// `POST /master-lists/{id}/orders`, with an optional `Idempotency-Key`.
    fn create_order(
        &self,
        list_id: MasterListId,
        order: &NewOrder,
        idempotency_key: Option<&str>,
    ) -> impl Future<Output = Result<PurchaseOrderLine, ApiError>> + Send;

    /// `GET /orders/{id}`
    fn get_order(
        &self,
        id: PurchaseOrderId,
    ) -> impl Future<Output = Result<PurchaseOrderLine, ApiError>> + Send;

    /// `PUT /orders/{id}`
    fn update_order_quantity(
        &self,
        id: PurchaseOrderId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<PurchaseOrderLine, ApiError>> + Send;

    /// `PUT /orders/{id}/status`
    fn set_order_status(
        &self,
        id: PurchaseOrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<PurchaseOrderLine, ApiError>> + Send;
}

/// Submitted lists, their items and checklist export.
pub trait SubmissionsApi: Send + Sync {
    /// `GET /submissions?status=&archived=`
    fn list_submissions(
        &self,
        view: SubmissionView,
    ) -> impl Future<Output = Result<Vec<SubmissionSummary>, ApiError>> + Send;

    /// `GET /submissions/{id}`
    fn get_submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `POST /submissions/{id}/submit`
    fn submit(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `PUT /submissions/{id}/approve`
    fn approve(
        &self,
        id: SubmissionId,
        admin_message: Option<&str>,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `PUT /submissions/{id}/reject`
    fn reject(
        &self,
        id: SubmissionId,
        admin_message: &str,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `POST /submissions/{id}/revert`
    fn revert(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `POST /submissions/{id}/archive`
    fn archive(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `POST /submissions/{id}/unarchive`
    fn unarchive(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `DELETE /submissions/{id}`
    fn delete_submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /submissions/{id}/items/{itemId}/discard` or `/restore`
    fn set_item_discarded(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        discarded: bool,
    ) -> impl Future<Output = Result<SubmittedItem, ApiError>> + Send;

    /// `POST /submissions/{id}/items`
    fn add_items(
        &self,
        id: SubmissionId,
        items: &[NewSubmittedItem],
    ) -> impl Future<Output = Result<SubmittedList, ApiError>> + Send;

    /// `PUT /submissions/{id}/items/{itemId}`
    fn update_submitted_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        patch: &SubmittedItemPatch,
    ) -> impl Future<Output = Result<SubmittedItem, ApiError>> + Send;

    /// `DELETE /submissions/{id}/items/{itemId}`
    fn remove_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /submissions/{id}/convert-checklist`
    fn convert_to_checklist(
        &self,
        id: SubmissionId,
        options: &ConvertOptions,
    ) -> impl Future<Output = Result<Checklist, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::RateLimited(5).is_retryable());
        assert!(ApiError::status(503, "down").is_retryable());
        assert!(!ApiError::status(409, "conflict").is_retryable());
        assert!(!ApiError::NotFound("gone".to_string()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_user_message_is_verbatim() {
        assert_eq!(
            ApiError::status(422, "Informe o motivo da rejeição").user_message(),
            "Informe o motivo da rejeição"
        );
        assert_eq!(
            ApiError::Parse("bad json".to_string()).user_message(),
            DEFAULT_ERROR_MESSAGE
        );
    }
}
