//! Ferrik REST API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP with JSON bodies.
//! Caches menu, mood menu and restaurant responses using `moka`.

mod cache;

use std::sync::Arc;

use ferrik_core::TelegramUserId;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::types::{
    HealthStatus, MenuFilter, MenuPage, MoodMenu, OrderConfirmation, OrderHistory, OrderRequest,
    OrderSummary, PromoRequest, PromoValidation, Restaurant, RestaurantList,
};

use cache::{CacheKey, CacheValue};

const USER_AGENT: &str = concat!("ferrik-client/", env!("CARGO_PKG_VERSION"));
const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Longest body excerpt kept in logs and error messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Whether an `{"ok": false}` envelope is an error for this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Envelope {
    Strict,
    AllowNotOk,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Ferrik REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
/// Menu, mood menu and restaurant responses are cached.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: String,
    init_data: Option<String>,
    /// `None` when the configured TTL is zero.
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .field("init_data", &self.inner.init_data.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base: config.endpoint_base(),
                init_data: config
                    .telegram_init_data
                    .as_ref()
                    .map(|s| s.expose_secret().to_string()),
                cache,
            }),
        })
    }

    /// Base address requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base)
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        envelope: Envelope,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4();
        let mut request = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .header("Accept", "application/json");
        if let Some(init_data) = &self.inner.init_data {
            request = request.header(INIT_DATA_HEADER, init_data);
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                request_id = %request_id,
                body = %excerpt(&response_text),
                "Ferrik API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&response_text),
            });
        }

        let value: serde_json::Value = match serde_json::from_str(&response_text) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    request_id = %request_id,
                    body = %excerpt(&response_text),
                    "Failed to parse Ferrik API response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if envelope == Envelope::Strict
            && value.get("ok").and_then(serde_json::Value::as_bool) == Some(false)
        {
            let message = error_message(&response_text);
            debug!(request_id = %request_id, message = %message, "API rejected request");
            return Err(ApiError::Rejected(message));
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!(
                error = %e,
                request_id = %request_id,
                "Unexpected Ferrik API response shape"
            );
            ApiError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.url(path));
        self.execute(request, Envelope::Strict).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.url(path)).query(query);
        self.execute(request, Envelope::Strict).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        envelope: Envelope,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.url(path)).json(body);
        self.execute(request, envelope).await
    }

    // =========================================================================
    // Service
    // =========================================================================

    /// Check that the API is up.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get("health").await
    }

    // =========================================================================
    // Menu Methods (cached)
    // =========================================================================

    /// Get a page of the menu.
    #[instrument(skip(self), fields(restaurant = ?filter.restaurant, category = ?filter.category))]
    pub async fn get_menu(&self, filter: &MenuFilter) -> Result<MenuPage, ApiError> {
        let cache_key = CacheKey::Menu(filter.clone());

        // Check cache
        if let Some(CacheValue::Menu(page)) = self.cached(&cache_key).await {
            debug!("Cache hit for menu");
            return Ok(page);
        }

        let page: MenuPage = self.get_with_query("menu", filter).await?;

        // Cache the result
        self.remember(cache_key, CacheValue::Menu(page.clone())).await;

        Ok(page)
    }

    /// Get the dishes tagged with a mood.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a blank tag.
    #[instrument(skip(self))]
    pub async fn get_mood_menu(&self, tag: &str) -> Result<MoodMenu, ApiError> {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err(ApiError::InvalidInput("mood tag is empty".to_string()));
        }
        let cache_key = CacheKey::MoodMenu(tag.clone());

        // Check cache
        if let Some(CacheValue::MoodMenu(menu)) = self.cached(&cache_key).await {
            debug!("Cache hit for mood menu");
            return Ok(menu);
        }

        let path = format!("menu/mood/{}", urlencoding::encode(&tag));
        let menu: MoodMenu = self.get(&path).await?;

        // Cache the result
        self.remember(cache_key, CacheValue::MoodMenu(menu.clone())).await;

        Ok(menu)
    }

    /// Get all partner restaurants.
    #[instrument(skip(self))]
    pub async fn get_restaurants(&self) -> Result<Vec<Restaurant>, ApiError> {
        // Check cache
        if let Some(CacheValue::Restaurants(restaurants)) =
            self.cached(&CacheKey::Restaurants).await
        {
            debug!("Cache hit for restaurants");
            return Ok(restaurants);
        }

        let list: RestaurantList = self.get("restaurants").await?;

        // Cache the result
        self.remember(CacheKey::Restaurants, CacheValue::Restaurants(list.data.clone())).await;

        Ok(list.data)
    }

    // =========================================================================
    // Order Methods (not cached)
    // =========================================================================

    /// Place an order.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        let confirmation: OrderConfirmation = self.post("order", order, Envelope::Strict).await?;
        tracing::info!(order_id = %confirmation.order_id, "Order created");
        Ok(confirmation)
    }

    /// Recent orders of a user, newest first.
    #[instrument(skip(self))]
    pub async fn get_user_orders(
        &self,
        user_id: TelegramUserId,
        limit: Option<u32>,
    ) -> Result<Vec<OrderSummary>, ApiError> {
        let path = format!("orders/user/{user_id}");
        let query: Vec<(&str, u32)> = limit.map(|l| ("limit", l)).into_iter().collect();
        let history: OrderHistory = self.get_with_query(&path, &query).await?;
        Ok(history.data)
    }

    /// Check a promo code.
    ///
    /// An unknown or expired code is an `Ok` answer with `valid == false`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a blank code, or an error if the
    /// request itself fails.
    #[instrument(skip(self))]
    pub async fn validate_promo(&self, code: &str) -> Result<PromoValidation, ApiError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::InvalidInput("promo code is empty".to_string()));
        }
        self.post(
            "promo/validate",
            &PromoRequest { code },
            Envelope::AllowNotOk,
        )
        .await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop all cached menu and restaurant responses.
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Human-readable message from an error body.
///
/// Prefers FastAPI's `detail`, then `message`, then `error`, then the raw
/// body excerpt.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| match value.get(key)? {
                    serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                    serde_json::Value::String(_) | serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
        });

    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "(empty response body)".to_string()
        } else {
            excerpt(trimmed)
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = client("http://localhost:8000/api/v1/");
        assert_eq!(api.url("menu"), "http://localhost:8000/api/v1/menu");
        assert_eq!(api.base_url(), "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Promo code is required"}"#),
            "Promo code is required"
        );
        assert_eq!(
            error_message(r#"{"ok": false, "message": "Order not found"}"#),
            "Order not found"
        );
    }

    #[test]
    fn test_error_message_structured_detail() {
        let message = error_message(r#"{"detail": [{"loc": ["body", "items"]}]}"#);
        assert!(message.contains("items"));
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message("   "), "(empty response body)");
        assert_eq!(error_message(&"x".repeat(900)).len(), BODY_EXCERPT_CHARS);
    }

    #[test]
    fn test_debug_hides_init_data() {
        let mut config = ClientConfig::new(Url::parse("http://localhost:1").unwrap());
        config.telegram_init_data = Some("hash=secret_signature".to_string().into());
        let api = ApiClient::new(&config).unwrap();
        let debug_output = format!("{api:?}");
        assert!(!debug_output.contains("secret_signature"));
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected_before_sending() {
        let api = client("http://127.0.0.1:9");
        assert!(matches!(
            api.validate_promo("   ").await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.get_mood_menu("").await,
            Err(ApiError::InvalidInput(_))
        ));
    }
}
