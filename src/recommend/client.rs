//! Recommendation service client.
//!
//! [`HttpRecommendationClient`] POSTs the trimmed utterance to the
//! configured `{base_url}/chat` endpoint and returns the first product of the
//! response array. All connection details come from
//! [`ApiConfig`](crate::config::ApiConfig); nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ApiConfig;

use super::product::{ApiProduct, Product};

// ---------------------------------------------------------------------------
// RecommendError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching a recommendation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    /// HTTP transport or connection error.
    #[error("recommendation request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("recommendation request timed out")]
    Timeout,

    /// The service answered with a non-success status code.
    #[error("recommendation service returned status {0}")]
    Status(u16),

    /// The response body could not be parsed as a product array.
    #[error("failed to parse recommendation response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RecommendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RecommendError::Timeout
        } else {
            RecommendError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RecommendationClient trait
// ---------------------------------------------------------------------------

/// Async trait for the product-recommendation collaborator.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn RecommendationClient>`. Returns `Ok(None)` when the service has
/// no product for the request — that is a distinct outcome, not a failure.
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    async fn recommend(&self, message: &str) -> Result<Option<Product>, RecommendError>;
}

// ---------------------------------------------------------------------------
// HttpRecommendationClient
// ---------------------------------------------------------------------------

/// Calls the recommendation endpoint over HTTP.
pub struct HttpRecommendationClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpRecommendationClient {
    /// Build a client from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`. A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl RecommendationClient for HttpRecommendationClient {
    async fn recommend(&self, message: &str) -> Result<Option<Product>, RecommendError> {
        let url = format!("{}/chat", self.config.base_url);
        let body = serde_json::json!({
            "session_id": self.config.session_id,
            "message": message.trim(),
        });

        log::debug!("recommend: POST {url} for {:?}", message.trim());
        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecommendError::Status(status.as_u16()));
        }

        let products: Vec<ApiProduct> = response
            .json()
            .await
            .map_err(|e| RecommendError::Parse(e.to_string()))?;

        log::debug!("recommend: {} product(s) in response", products.len());
        Ok(products.into_iter().next().map(Product::from))
    }
}

// ---------------------------------------------------------------------------
// MockRecommendationClient  (test-only)
// ---------------------------------------------------------------------------

/// A test double with a scripted response queue.
///
/// Records every request message; answers with queued responses in order,
/// falling back to `Ok(None)` when the queue is empty.
#[cfg(test)]
pub struct MockRecommendationClient {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<Option<Product>, RecommendError>>>,
    requests: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockRecommendationClient {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A client whose next response is the given product.
    pub fn ok(product: Product) -> Self {
        let mock = Self::new();
        mock.push_response(Ok(Some(product)));
        mock
    }

    /// A client whose next response is a transport failure.
    pub fn failing(error: RecommendError) -> Self {
        let mock = Self::new();
        mock.push_response(Err(error));
        mock
    }

    pub fn push_response(&self, response: Result<Option<Product>, RecommendError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// All request messages seen so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl RecommendationClient for MockRecommendationClient {
    async fn recommend(&self, message: &str) -> Result<Option<Product>, RecommendError> {
        self.requests.lock().unwrap().push(message.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: "p-1".into(),
            name: "Broccoli".into(),
            image: "https://cdn.example.com/broccoli.jpg".into(),
            price: 3900.0,
            description: None,
            brand: None,
            main_features: Vec::new(),
            tags: Vec::new(),
            delivery_days: None,
            category: None,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _client = HttpRecommendationClient::from_config(&ApiConfig::default());
    }

    /// Verify the HTTP client is usable as `dyn RecommendationClient`.
    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn RecommendationClient> =
            Box::new(HttpRecommendationClient::from_config(&ApiConfig::default()));
        drop(client);
    }

    #[test]
    fn error_display_mentions_cause() {
        assert!(RecommendError::Status(502).to_string().contains("502"));
        assert!(RecommendError::Parse("bad json".into())
            .to_string()
            .contains("bad json"));
    }

    #[tokio::test]
    async fn mock_replays_queue_then_returns_none() {
        let mock = MockRecommendationClient::ok(sample_product());

        assert_eq!(
            mock.recommend("broccoli").await,
            Ok(Some(sample_product()))
        );
        // Queue exhausted: empty result, not an error.
        assert_eq!(mock.recommend("again").await, Ok(None));
        assert_eq!(mock.requests(), vec!["broccoli", "again"]);
    }

    #[tokio::test]
    async fn mock_failing_surfaces_error() {
        let mock = MockRecommendationClient::failing(RecommendError::Timeout);
        assert_eq!(mock.recommend("broccoli").await, Err(RecommendError::Timeout));
    }
}
