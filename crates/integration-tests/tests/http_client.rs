//! Integration tests for the HTTP client against a mock back-office.
//!
//! These tests verify the wire contract: auth header, path layout, error
//! bodies and the idempotency key, using a real server on localhost.

#![allow(clippy::unwrap_used)]

use pantry_admin::api::{
    ApiError, DEFAULT_ERROR_MESSAGE, FailureTarget, InMemoryBackOffice, MasterListApi,
    PantryClient, SubmissionsApi,
};
use pantry_admin::models::{NewOrder, SubmissionView};
use pantry_core::{
    ListKind, MasterListId, StockItemId, SubmissionId, SubmissionStatus, SupplierId,
};
use pantry_integration_tests::fixtures::{master_list, q, stock, submission, submitted_item};
use pantry_integration_tests::{MOCK_TOKEN, MockServer};

async fn server() -> MockServer {
    let backend = InMemoryBackOffice::new();
    backend
        .insert_master_list(master_list(
            4,
            "Cozinha",
            vec![stock(12, "Arroz", "2", "5", "10")],
        ))
        .await;
    backend
        .insert_submission(submission(
            31,
            ListKind::Quick,
            SubmissionStatus::Pendente,
            vec![submitted_item(1, "Arroz")],
        ))
        .await;
    MockServer::start(backend).await.unwrap()
}

// =============================================================================
// Connection Tests
// =============================================================================

#[tokio::test]
async fn test_base_path_is_kept_with_or_without_trailing_slash() {
    let server = server().await;

    let client = server.client();
    assert!(client.base_url().path().ends_with("/api/v1/"));
    let list = client.get_master_list(MasterListId::new(4)).await.unwrap();
    assert_eq!(list.name, "Cozinha");

    let mut config = server.api_config(MOCK_TOKEN);
    config.base_url.set_path("/api/v1/");
    let client = PantryClient::new(&config).unwrap();
    let list = client.get_master_list(MasterListId::new(4)).await.unwrap();
    assert_eq!(list.items.len(), 1);
}

#[tokio::test]
async fn test_bad_token_is_unauthorized() {
    let server = server().await;
    let client = PantryClient::new(&server.api_config("wrong-token-9c1e")).unwrap();

    let err = client
        .get_submission(SubmissionId::new(31))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_listing_query_reaches_the_server() {
    let server = server().await;
    let client = server.client();

    let pending = client
        .list_submissions(SubmissionView::default())
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let approved = client
        .list_submissions(SubmissionView::Active(Some(SubmissionStatus::Aprovado)))
        .await
        .unwrap();
    assert!(approved.is_empty());

    let archived = client
        .list_submissions(SubmissionView::Archived)
        .await
        .unwrap();
    assert!(archived.is_empty());
}

// =============================================================================
// Error Body Tests
// =============================================================================

#[tokio::test]
async fn test_error_text_is_passed_through_verbatim() {
    let server = server().await;
    server
        .backend
        .fail(FailureTarget::Submission(SubmissionId::new(31)), 409, "Lista já arquivada")
        .await;

    let err = server
        .client()
        .archive(SubmissionId::new(31))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        ApiError::Api { status: 409, message } if message == "Lista já arquivada"
    ));
    assert_eq!(err.user_message(), "Lista já arquivada");
}

#[tokio::test]
async fn test_blank_error_text_uses_default_message() {
    let server = server().await;
    server
        .backend
        .fail(FailureTarget::Submission(SubmissionId::new(31)), 500, "  ")
        .await;

    let err = server
        .client()
        .get_submission(SubmissionId::new(31))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        ApiError::Api { status: 500, message } if message == DEFAULT_ERROR_MESSAGE
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let server = server().await;

    let err = server
        .client()
        .get_submission(SubmissionId::new(999))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(message) if message.contains("999")));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = server().await;
    server
        .backend
        .fail(FailureTarget::SubmissionListing, 429, "slow down")
        .await;

    let err = server
        .client()
        .list_submissions(SubmissionView::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(7)));
}

#[tokio::test]
async fn test_validation_status_survives_the_round_trip() {
    let server = server().await;

    let err = server
        .client()
        .reject(SubmissionId::new(31), " ")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 422, .. }));
}

// =============================================================================
// Idempotency Tests
// =============================================================================

#[tokio::test]
async fn test_idempotency_key_deduplicates_orders() {
    let server = server().await;
    let client = server.client();
    let order = NewOrder {
        item_id: StockItemId::new(12),
        supplier_id: SupplierId::new(9),
        requested_quantity: q("10"),
    };

    let first = client
        .create_order(MasterListId::new(4), &order, Some("k-1:12"))
        .await
        .unwrap();
    let retried = client
        .create_order(MasterListId::new(4), &order, Some("k-1:12"))
        .await
        .unwrap();
    assert_eq!(first.id, retried.id);

    let unkeyed = client
        .create_order(MasterListId::new(4), &order, None)
        .await
        .unwrap();
    assert_ne!(first.id, unkeyed.id);
    assert_eq!(server.backend.orders().await.len(), 2);
}
