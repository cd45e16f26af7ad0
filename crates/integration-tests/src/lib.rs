//! Integration test support for the Pantry back-office.
//!
//! [`MockServer`] serves the back-office REST API over HTTP on an ephemeral
//! port, backed by an [`InMemoryBackOffice`]. Tests drive it through the real
//! [`PantryClient`], so requests, status codes and error bodies go over the
//! wire exactly as they would against the production API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pantry-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `http_client` - Wire format, auth, error bodies
//! - `replenishment` - Reorder engine end to end
//! - `submissions` - Approval workflow end to end

pub mod fixtures;

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{AUTHORIZATION, RETRY_AFTER};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use pantry_admin::api::{ApiError, InMemoryBackOffice, MasterListApi, PantryClient, SubmissionsApi};
use pantry_admin::config::ApiConfig;
use pantry_admin::models::purchase_order::{OrderQuantityUpdate, OrderStatusUpdate};
use pantry_admin::models::submission::{ApproveRequest, NewSubmittedItems, RejectRequest};
use pantry_admin::models::{
    Checklist, ConvertOptions, ItemPatch, MasterList, NewMasterList, NewOrder, PurchaseOrderLine,
    StockItem, SubmissionSummary, SubmissionView, SubmittedItem, SubmittedItemPatch,
    SubmittedList, ThresholdConfig, TransferRequest,
};
use pantry_core::{
    MasterListId, PurchaseOrderId, StockItemId, SubmissionId, SubmissionStatus, SubmittedItemId,
};
use secrecy::SecretString;
use serde::Deserialize;
use tokio::net::TcpListener;
use url::Url;

/// Token the mock server accepts.
pub const MOCK_TOKEN: &str = "pantry-test-Token-4f8a";

/// Path prefix the API is served under.
const BASE_PATH: &str = "/api/v1";

/// An HTTP back-office running in the background.
pub struct MockServer {
    pub addr: SocketAddr,
    pub backend: InMemoryBackOffice,
}

impl MockServer {
    /// Start serving `backend` on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start(backend: InMemoryBackOffice) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(backend.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock server stopped: {e}");
            }
        });
        Ok(Self { addr, backend })
    }

    /// Base URL of the API, including the path prefix.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a valid URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}{BASE_PATH}", self.addr)).expect("valid mock URL")
    }

    /// Connection settings for this server with the given token.
    #[must_use]
    pub fn api_config(&self, token: &str) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url(),
            token: SecretString::from(token),
            timeout: Duration::from_secs(5),
        }
    }

    /// A client authenticated with [`MOCK_TOKEN`].
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client(&self) -> PantryClient {
        PantryClient::new(&self.api_config(MOCK_TOKEN)).expect("client builds")
    }
}

/// API error rendered as `{"error": "..."}` with the matching status.
pub struct MockError(ApiError);

impl From<ApiError> for MockError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            ApiError::Api { status, message } => (status, message),
            ApiError::NotFound(message) => (404, message),
            other => (500, other.to_string()),
        };
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(serde_json::json!({ "error": message }))).into_response();
        if status == StatusCode::TOO_MANY_REQUESTS {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static("7"));
        }
        response
    }
}

type MockResult<T> = Result<Json<T>, MockError>;

async fn require_token(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {MOCK_TOKEN}");
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid token" })),
        )
            .into_response();
    }
    next.run(request).await
}

fn router(backend: InMemoryBackOffice) -> Router {
    let api = Router::new()
        .route("/master-lists", post(create_master_list))
        .route("/master-lists/{id}", get(get_master_list))
        .route("/master-lists/{id}/items/{item_id}", put(update_item))
        .route("/master-lists/{id}/items/{item_id}/config", put(update_item_config))
        .route("/master-lists/{id}/items/{item_id}/transfer", post(transfer_item))
        .route("/master-lists/{id}/orders", post(create_order))
        .route("/orders/{id}", get(get_order).put(update_order_quantity))
        .route("/orders/{id}/status", put(set_order_status))
        .route("/submissions", get(list_submissions))
        .route("/submissions/{id}", get(get_submission).delete(delete_submission))
        .route("/submissions/{id}/submit", post(submit))
        .route("/submissions/{id}/approve", put(approve))
        .route("/submissions/{id}/reject", put(reject))
        .route("/submissions/{id}/revert", post(revert))
        .route("/submissions/{id}/archive", post(archive))
        .route("/submissions/{id}/unarchive", post(unarchive))
        .route("/submissions/{id}/items", post(add_items))
        .route(
            "/submissions/{id}/items/{item_id}",
            put(update_submitted_item).delete(remove_item),
        )
        .route("/submissions/{id}/items/{item_id}/discard", put(discard_item))
        .route("/submissions/{id}/items/{item_id}/restore", put(restore_item))
        .route("/submissions/{id}/convert-checklist", post(convert_to_checklist))
        .layer(middleware::from_fn(require_token))
        .with_state(backend);

    Router::new().nest(BASE_PATH, api)
}

// ============================================================================
// Master lists and orders
// ============================================================================

async fn get_master_list(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<MasterListId>,
) -> MockResult<MasterList> {
    Ok(Json(backend.get_master_list(id).await?))
}

async fn create_master_list(
    State(backend): State<InMemoryBackOffice>,
    Json(input): Json<NewMasterList>,
) -> MockResult<MasterList> {
    Ok(Json(backend.create_master_list(&input).await?))
}

async fn update_item(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(MasterListId, StockItemId)>,
    Json(patch): Json<ItemPatch>,
) -> MockResult<StockItem> {
    Ok(Json(backend.update_item(id, item_id, &patch).await?))
}

async fn update_item_config(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(MasterListId, StockItemId)>,
    Json(config): Json<ThresholdConfig>,
) -> MockResult<StockItem> {
    Ok(Json(backend.update_item_config(id, item_id, &config).await?))
}

async fn transfer_item(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(MasterListId, StockItemId)>,
    Json(request): Json<TransferRequest>,
) -> MockResult<StockItem> {
    Ok(Json(backend.transfer_item(id, item_id, &request).await?))
}

async fn create_order(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<MasterListId>,
    headers: HeaderMap,
    Json(order): Json<NewOrder>,
) -> MockResult<PurchaseOrderLine> {
    let key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok());
    Ok(Json(backend.create_order(id, &order, key).await?))
}

async fn get_order(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<PurchaseOrderId>,
) -> MockResult<PurchaseOrderLine> {
    Ok(Json(backend.get_order(id).await?))
}

async fn update_order_quantity(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<PurchaseOrderId>,
    Json(body): Json<OrderQuantityUpdate>,
) -> MockResult<PurchaseOrderLine> {
    Ok(Json(
        backend
            .update_order_quantity(id, body.requested_quantity)
            .await?,
    ))
}

async fn set_order_status(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<PurchaseOrderId>,
    Json(body): Json<OrderStatusUpdate>,
) -> MockResult<PurchaseOrderLine> {
    Ok(Json(backend.set_order_status(id, body.status).await?))
}

// ============================================================================
// Submissions
// ============================================================================

#[derive(Deserialize)]
struct ListParams {
    status: Option<SubmissionStatus>,
    #[serde(default)]
    archived: bool,
}

async fn list_submissions(
    State(backend): State<InMemoryBackOffice>,
    Query(params): Query<ListParams>,
) -> MockResult<Vec<SubmissionSummary>> {
    let view = if params.archived {
        SubmissionView::Archived
    } else {
        SubmissionView::Active(params.status)
    };
    Ok(Json(backend.list_submissions(view).await?))
}

async fn get_submission(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.get_submission(id).await?))
}

async fn delete_submission(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
) -> Result<StatusCode, MockError> {
    backend.delete_submission(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.submit(id).await?))
}

async fn approve(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
    Json(body): Json<ApproveRequest>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.approve(id, body.admin_message.as_deref()).await?))
}

async fn reject(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
    Json(body): Json<RejectRequest>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.reject(id, &body.admin_message).await?))
}

async fn revert(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.revert(id).await?))
}

async fn archive(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.archive(id).await?))
}

async fn unarchive(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.unarchive(id).await?))
}

async fn add_items(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
    Json(body): Json<NewSubmittedItems>,
) -> MockResult<SubmittedList> {
    Ok(Json(backend.add_items(id, &body.items).await?))
}

async fn update_submitted_item(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(SubmissionId, SubmittedItemId)>,
    Json(patch): Json<SubmittedItemPatch>,
) -> MockResult<SubmittedItem> {
    Ok(Json(backend.update_submitted_item(id, item_id, &patch).await?))
}

async fn remove_item(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(SubmissionId, SubmittedItemId)>,
) -> Result<StatusCode, MockError> {
    backend.remove_item(id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn discard_item(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(SubmissionId, SubmittedItemId)>,
) -> MockResult<SubmittedItem> {
    Ok(Json(backend.set_item_discarded(id, item_id, true).await?))
}

async fn restore_item(
    State(backend): State<InMemoryBackOffice>,
    Path((id, item_id)): Path<(SubmissionId, SubmittedItemId)>,
) -> MockResult<SubmittedItem> {
    Ok(Json(backend.set_item_discarded(id, item_id, false).await?))
}

async fn convert_to_checklist(
    State(backend): State<InMemoryBackOffice>,
    Path(id): Path<SubmissionId>,
    Json(options): Json<ConvertOptions>,
) -> MockResult<Checklist> {
    Ok(Json(backend.convert_to_checklist(id, &options).await?))
}
