//! HTTP client for the back-office API.

use std::sync::Arc;

use pantry_core::{
    MasterListId, OrderStatus, PurchaseOrderId, Quantity, StockItemId, SubmissionId,
    SubmittedItemId,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{ApiError, DEFAULT_ERROR_MESSAGE, MasterListApi, SubmissionsApi};
use crate::config::ApiConfig;
use crate::models::purchase_order::{OrderQuantityUpdate, OrderStatusUpdate};
use crate::models::submission::{ApproveRequest, NewSubmittedItems, RejectRequest};
use crate::models::{
    Checklist, ConvertOptions, ItemPatch, MasterList, NewMasterList, NewOrder, NewSubmittedItem,
    PurchaseOrderLine, StockItem, SubmissionSummary, SubmissionView, SubmittedItem,
    SubmittedItemPatch, SubmittedList, ThresholdConfig, TransferRequest,
};

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Back-office API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct PantryClient {
    inner: Arc<PantryClientInner>,
}

struct PantryClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl PantryClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.token.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| ApiError::Parse(format!("Invalid API token format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        // Paths are joined relative to the base, which must end in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(PantryClientInner { client, base_url }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Parse(format!("Invalid request path {path}: {e}")))
    }

    /// Execute a GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url(path)?)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request without a body.
    async fn post_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.inner.client.post(self.url(path)?).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    async fn put<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(path)?)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request without a body.
    async fn put_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.inner.client.put(self.url(path)?).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a DELETE request.
    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.inner.client.delete(self.url(path)?).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse an error response, keeping the server's `error` text verbatim.
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ApiError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return ApiError::Unauthorized;
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        if status == 404 {
            return ApiError::NotFound(message);
        }

        ApiError::Api { status, message }
    }
}

/// Extract the `error` field of a body, or fall back to the default message.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

impl std::fmt::Debug for PantryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PantryClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl MasterListApi for PantryClient {
    #[instrument(skip(self), fields(list_id = %id))]
    async fn get_master_list(&self, id: MasterListId) -> Result<MasterList, ApiError> {
        self.get(self.url(&format!("master-lists/{id}"))?).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_master_list(&self, input: &NewMasterList) -> Result<MasterList, ApiError> {
        self.post("master-lists", input).await
    }

    #[instrument(skip(self, patch), fields(list_id = %list_id, item_id = %item_id))]
    async fn update_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        patch: &ItemPatch,
    ) -> Result<StockItem, ApiError> {
        self.put(&format!("master-lists/{list_id}/items/{item_id}"), patch)
            .await
    }

    #[instrument(skip(self), fields(list_id = %list_id, item_id = %item_id))]
    async fn update_item_config(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        config: &ThresholdConfig,
    ) -> Result<StockItem, ApiError> {
        self.put(
            &format!("master-lists/{list_id}/items/{item_id}/config"),
            config,
        )
        .await
    }

    #[instrument(skip(self), fields(list_id = %list_id, item_id = %item_id))]
    async fn transfer_item(
        &self,
        list_id: MasterListId,
        item_id: StockItemId,
        request: &TransferRequest,
    ) -> Result<StockItem, ApiError> {
        self.post(
            &format!("master-lists/{list_id}/items/{item_id}/transfer"),
            request,
        )
        .await
    }

    #[instrument(skip(self), fields(list_id = %list_id, item_id = %order.item_id))]
    async fn create_order(
        &self,
        list_id: MasterListId,
        order: &NewOrder,
        idempotency_key: Option<&str>,
    ) -> Result<PurchaseOrderLine, ApiError> {
        let mut request = self
            .inner
            .client
            .post(self.url(&format!("master-lists/{list_id}/orders"))?)
            .json(order);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: PurchaseOrderId) -> Result<PurchaseOrderLine, ApiError> {
        self.get(self.url(&format!("orders/{id}"))?).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn update_order_quantity(
        &self,
        id: PurchaseOrderId,
        quantity: Quantity,
    ) -> Result<PurchaseOrderLine, ApiError> {
        self.put(
            &format!("orders/{id}"),
            &OrderQuantityUpdate {
                requested_quantity: quantity,
            },
        )
        .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn set_order_status(
        &self,
        id: PurchaseOrderId,
        status: OrderStatus,
    ) -> Result<PurchaseOrderLine, ApiError> {
        self.put(&format!("orders/{id}/status"), &OrderStatusUpdate { status })
            .await
    }
}

impl SubmissionsApi for PantryClient {
    #[instrument(skip(self))]
    async fn list_submissions(
        &self,
        view: SubmissionView,
    ) -> Result<Vec<SubmissionSummary>, ApiError> {
        let mut url = self.url("submissions")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in view.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        self.get(url).await
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn get_submission(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        self.get(self.url(&format!("submissions/{id}"))?).await
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn submit(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        self.post_empty(&format!("submissions/{id}/submit")).await
    }

    #[instrument(skip(self, admin_message), fields(submission_id = %id))]
    async fn approve(
        &self,
        id: SubmissionId,
        admin_message: Option<&str>,
    ) -> Result<SubmittedList, ApiError> {
        let body = ApproveRequest {
            admin_message: admin_message.map(str::to_string),
        };
        self.put(&format!("submissions/{id}/approve"), &body).await
    }

    #[instrument(skip(self, admin_message), fields(submission_id = %id))]
    async fn reject(&self, id: SubmissionId, admin_message: &str) -> Result<SubmittedList, ApiError> {
        let body = RejectRequest {
            admin_message: admin_message.to_string(),
        };
        self.put(&format!("submissions/{id}/reject"), &body).await
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn revert(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        self.post_empty(&format!("submissions/{id}/revert")).await
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn archive(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        self.post_empty(&format!("submissions/{id}/archive")).await
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn unarchive(&self, id: SubmissionId) -> Result<SubmittedList, ApiError> {
        self.post_empty(&format!("submissions/{id}/unarchive")).await
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn delete_submission(&self, id: SubmissionId) -> Result<(), ApiError> {
        self.delete(&format!("submissions/{id}")).await
    }

    #[instrument(skip(self), fields(submission_id = %id, item_id = %item_id))]
    async fn set_item_discarded(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        discarded: bool,
    ) -> Result<SubmittedItem, ApiError> {
        let action = if discarded { "discard" } else { "restore" };
        self.put_empty(&format!("submissions/{id}/items/{item_id}/{action}"))
            .await
    }

    #[instrument(skip(self, items), fields(submission_id = %id, count = items.len()))]
    async fn add_items(
        &self,
        id: SubmissionId,
        items: &[NewSubmittedItem],
    ) -> Result<SubmittedList, ApiError> {
        let body = NewSubmittedItems {
            items: items.to_vec(),
        };
        self.post(&format!("submissions/{id}/items"), &body).await
    }

    #[instrument(skip(self, patch), fields(submission_id = %id, item_id = %item_id))]
    async fn update_submitted_item(
        &self,
        id: SubmissionId,
        item_id: SubmittedItemId,
        patch: &SubmittedItemPatch,
    ) -> Result<SubmittedItem, ApiError> {
        self.put(&format!("submissions/{id}/items/{item_id}"), patch)
            .await
    }

    #[instrument(skip(self), fields(submission_id = %id, item_id = %item_id))]
    async fn remove_item(&self, id: SubmissionId, item_id: SubmittedItemId) -> Result<(), ApiError> {
        self.delete(&format!("submissions/{id}/items/{item_id}"))
            .await
    }

    #[instrument(skip(self, options), fields(submission_id = %id))]
    async fn convert_to_checklist(
        &self,
        id: SubmissionId,
        options: &ConvertOptions,
    ) -> Result<Checklist, ApiError> {
        self.post(&format!("submissions/{id}/convert-checklist"), options)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn config(base: &str) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(base).unwrap(),
            token: SecretString::from("tok3n-Value"),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_error_message_uses_error_field() {
        assert_eq!(
            error_message(r#"{"error":"Lista já arquivada"}"#),
            "Lista já arquivada"
        );
    }

    #[test]
    fn test_error_message_falls_back() {
        assert_eq!(error_message(""), DEFAULT_ERROR_MESSAGE);
        assert_eq!(error_message("<html>oops</html>"), DEFAULT_ERROR_MESSAGE);
        assert_eq!(error_message(r#"{"error":"  "}"#), DEFAULT_ERROR_MESSAGE);
        assert_eq!(error_message(r#"{"message":"x"}"#), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_paths_join_under_base_path() {
        let client = PantryClient::new(&config("https://api.pantry.test/v1")).unwrap();
        assert_eq!(
            client.url("/submissions/3/approve").unwrap().as_str(),
            "https://api.pantry.test/v1/submissions/3/approve"
        );

        let root = PantryClient::new(&config("https://api.pantry.test")).unwrap();
        assert_eq!(
            root.url("master-lists/1").unwrap().as_str(),
            "https://api.pantry.test/master-lists/1"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let client = PantryClient::new(&config("https://api.pantry.test")).unwrap();
        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("api.pantry.test"));
        assert!(!debug_output.contains("tok3n-Value"));
    }
}
