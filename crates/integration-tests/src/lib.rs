//! Integration tests for Ferrik.
//!
//! Provides [`MockApi`], an in-process stand-in for the Ferrik REST API
//! (`/api/v1`) built with `axum`. It serves a small fixed menu, records the
//! orders it receives and can be told to answer with errors, so the client
//! and the cart-to-order flow can be tested without the network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ferrik-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let api = MockApi::start().await;
//! let client = api.client();
//! let menu = client.get_menu(&MenuFilter::default()).await?;
//! assert_eq!(api.hits("menu"), 1);
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ferrik_client::{ApiClient, ClientConfig};
use serde::Deserialize;
use serde_json::{Value, json};

/// Promo codes the mock accepts, with their discount percentage.
pub const PROMO_CODES: [(&str, u32); 2] = [("WELCOME10", 10), ("FERRIK25", 25)];

/// A canned failure returned by the next matching request.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Answer with this status and body.
    Status(StatusCode, Value),
    /// Answer `429 Too Many Requests` with this `Retry-After`.
    RateLimited(u64),
    /// Answer `200` with a body that is not JSON.
    Garbage,
}

/// Shared state of the mock server.
#[derive(Debug, Default)]
pub struct MockState {
    hits: Mutex<HashMap<&'static str, usize>>,
    orders: Mutex<Vec<Value>>,
    init_data: Mutex<Vec<Option<String>>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
}

impl MockState {
    fn hit(&self, route: &'static str, headers: &HeaderMap) -> Option<Failure> {
        *lock(&self.hits).entry(route).or_default() += 1;
        lock(&self.init_data).push(
            headers
                .get("X-Telegram-Init-Data")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        lock(&self.failures).remove(route)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running mock API server.
pub struct MockApi {
    base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    /// Bind to a random local port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API listener");
        let addr = listener.local_addr().expect("Mock API has no local address");

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock API server failed");
        });

        Self {
            base_url: format!("http://{addr}/api/v1"),
            state,
        }
    }

    /// API base address, e.g. `http://127.0.0.1:12345/api/v1`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(url::Url::parse(&self.base_url).expect("Mock API URL is valid"))
    }

    /// Client pointing at this server.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).expect("Failed to build API client")
    }

    /// Number of requests served on `route` (e.g. `"menu"`, `"order"`).
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        lock(&self.state.hits).get(route).copied().unwrap_or(0)
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state.orders).clone()
    }

    /// `X-Telegram-Init-Data` header of every request, in arrival order.
    #[must_use]
    pub fn init_data_headers(&self) -> Vec<Option<String>> {
        lock(&self.state.init_data).clone()
    }

    /// Make the next request on `route` fail.
    pub fn fail_next(&self, route: &'static str, failure: Failure) {
        lock(&self.state.failures).insert(route, failure);
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Menu rows as the sheet-backed API returns them: numeric and string ids,
/// prices as numbers or strings, `null` for empty cells.
#[must_use]
pub fn menu_fixture() -> Vec<Value> {
    vec![
        json!({
            "id": "p1", "category": "Піца", "name": "Маргарита",
            "description": "Томати, моцарела", "price": 185.5, "restaurant": "Napoli",
            "time_delivery": 40, "photo_url": null, "active": true, "cook_time": 15,
            "allergens": "глютен", "rating": 4.8, "mood_tags": ["party", "movie"]
        }),
        json!({
            "id": "p2", "category": "Піца", "name": "Пепероні",
            "description": null, "price": "210 грн", "restaurant": "Napoli",
            "time_delivery": 45, "photo_url": "https://img.example/p2.jpg", "active": true,
            "cook_time": null, "allergens": null, "rating": 4.6, "mood_tags": ["spicy", "party"]
        }),
        json!({
            "id": 7, "category": "Напої", "name": "Лимонад",
            "description": "", "price": 45, "restaurant": "Fresh Bar",
            "time_delivery": 20, "photo_url": "", "active": true, "cook_time": 2,
            "allergens": "", "rating": 4.2, "mood_tags": ["calm", "movie"]
        }),
        json!({
            "id": "s1", "category": "Суші", "name": "Філадельфія",
            "description": "Лосось, сир", "price": 320, "restaurant": "Sakura",
            "time_delivery": 50, "photo_url": null, "active": false, "cook_time": 20,
            "allergens": "риба", "rating": 4.9, "mood_tags": ["romantic"]
        }),
    ]
}

fn restaurants_fixture() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Napoli", "category": "Піца", "rating": 4.7,
               "commission_pct": 15, "status": "active", "phone": "+380441112233"}),
        json!({"id": "fb", "name": "Fresh Bar", "category": "Напої", "rating": null,
               "commission_pct": null, "status": "active", "phone": null}),
    ]
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/menu", get(menu))
        .route("/api/v1/menu/mood/{tag}", get(mood_menu))
        .route("/api/v1/restaurants", get(restaurants))
        .route("/api/v1/order", post(create_order))
        .route("/api/v1/orders/user/{user_id}", get(user_orders))
        .route("/api/v1/promo/validate", post(validate_promo))
        .with_state(state)
}

fn failure_response(failure: Failure) -> Response {
    match failure {
        Failure::Status(status, body) => (status, Json(body)).into_response(),
        Failure::RateLimited(secs) => {
            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, Json(json!({"detail": "Too many requests"})))
                    .into_response();
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(secs));
            response
        }
        Failure::Garbage => (StatusCode::OK, "<html>maintenance</html>").into_response(),
    }
}

async fn health(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(failure) = state.hit("health", &headers) {
        return failure_response(failure);
    }
    Json(json!({"ok": true, "status": "healthy", "service": "ferrik-miniapp-api"})).into_response()
}

#[derive(Debug, Deserialize)]
struct MenuQuery {
    restaurant: Option<String>,
    category: Option<String>,
    active: Option<bool>,
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn menu(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<MenuQuery>,
) -> Response {
    if let Some(failure) = state.hit("menu", &headers) {
        return failure_response(failure);
    }

    let field = |item: &Value, key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);
    let filtered: Vec<Value> = menu_fixture()
        .into_iter()
        .filter(|item| {
            query
                .restaurant
                .as_ref()
                .is_none_or(|r| field(item, "restaurant").as_ref() == Some(r))
        })
        .filter(|item| {
            query
                .category
                .as_ref()
                .is_none_or(|c| field(item, "category").as_ref() == Some(c))
        })
        .filter(|item| {
            query
                .active
                .is_none_or(|a| item.get("active").and_then(Value::as_bool) == Some(a))
        })
        .collect();

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);
    let total = filtered.len();
    let page: Vec<Value> = filtered.into_iter().skip(offset).take(limit).collect();

    Json(json!({"ok": true, "data": page, "total": total, "limit": limit, "offset": offset}))
        .into_response()
}

async fn mood_menu(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(tag): Path<String>,
) -> Response {
    if let Some(failure) = state.hit("mood", &headers) {
        return failure_response(failure);
    }

    let items: Vec<Value> = menu_fixture()
        .into_iter()
        .filter(|item| {
            item.get("mood_tags")
                .and_then(Value::as_array)
                .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag.as_str())))
        })
        .collect();

    Json(json!({"ok": true, "mood": tag, "data": items, "count": items.len()})).into_response()
}

async fn restaurants(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(failure) = state.hit("restaurants", &headers) {
        return failure_response(failure);
    }
    Json(json!({"ok": true, "data": restaurants_fixture()})).into_response()
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state.hit("order", &headers) {
        return failure_response(failure);
    }

    let items = body.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
    if items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Order must contain items"})),
        )
            .into_response();
    }

    let eta = items
        .iter()
        .filter_map(|i| i.get("time_delivery").and_then(Value::as_u64))
        .max()
        .unwrap_or(30);

    let mut orders = lock(&state.orders);
    orders.push(body);
    let order_id = format!("ORD-{:04}", orders.len());

    Json(json!({
        "ok": true,
        "order_id": order_id,
        "status": "new",
        "eta_minutes": eta,
        "message": "Замовлення прийнято"
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn user_orders(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    if let Some(failure) = state.hit("orders", &headers) {
        return failure_response(failure);
    }

    let orders = lock(&state.orders);
    let rows: Vec<Value> = orders
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, o)| o["user"]["telegram_user_id"].as_i64() == Some(user_id))
        .take(query.limit.unwrap_or(10))
        .map(|(i, o)| {
            json!({
                "order_id": format!("ORD-{:04}", i + 1),
                "created_at": "2025-01-15 19:05:00",
                "total": o["total"],
                "status": "new",
                "items_count": o["items"].as_array().map_or(0, Vec::len),
            })
        })
        .collect();

    Json(json!({"ok": true, "data": rows})).into_response()
}

async fn validate_promo(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state.hit("promo", &headers) {
        return failure_response(failure);
    }

    let code = body
        .get("code")
        .and_then(Value::as_str)
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_default();
    if code.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Promo code is required"})),
        )
            .into_response();
    }

    match PROMO_CODES.iter().find(|(known, _)| *known == code) {
        Some((known, pct)) => Json(json!({
            "ok": true, "valid": true, "code": known, "discount_pct": pct,
            "message": format!("Знижка {pct}%")
        }))
        .into_response(),
        None => Json(json!({
            "ok": false, "valid": false, "message": "Промокод недійсний"
        }))
        .into_response(),
    }
}
