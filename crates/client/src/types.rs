//! Request and response types for the Ferrik API.
//!
//! Menu data comes from a hand-maintained sheet, so most response fields are
//! optional and `null` is read as the field's default.

use chrono::NaiveDateTime;
use ferrik_core::checkout::{self, CheckoutError, CheckoutSummary};
use ferrik_core::{
    CartItem, DeliveryType, ItemId, OrderId, PaymentMethod, Phone, Price, TelegramUserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Menu
// =============================================================================

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default, deserialize_with = "null_default")]
    pub restaurant: String,
    /// Delivery time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delivery: Option<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub photo_url: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Cooking time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub allergens: String,
    #[serde(default, deserialize_with = "null_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub mood_tags: Vec<String>,
}

impl MenuItem {
    /// Cart line for one unit of this dish.
    ///
    /// The restaurant and delivery time travel with the line so the order
    /// can be routed and its ETA estimated.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        let mut item = CartItem::new(self.id.clone(), self.price);
        if !self.name.is_empty() {
            item = item.with_name(self.name.clone());
        }
        if !self.restaurant.is_empty() {
            item = item.with_metadata("restaurant", self.restaurant.clone());
        }
        if let Some(minutes) = self.time_delivery {
            item = item.with_metadata("time_delivery", minutes);
        }
        item
    }
}

impl From<&MenuItem> for CartItem {
    fn from(item: &MenuItem) -> Self {
        item.to_cart_item()
    }
}

/// Query parameters for `GET /menu`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MenuFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl MenuFilter {
    /// Only dishes from `restaurant`.
    #[must_use]
    pub fn restaurant(mut self, restaurant: impl Into<String>) -> Self {
        self.restaurant = Some(restaurant.into());
        self
    }

    /// Only dishes in `category`.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Page size and offset.
    #[must_use]
    pub const fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// One page of `GET /menu`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MenuPage {
    #[serde(rename = "data", default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/// Dishes tagged with a mood (`GET /menu/mood/{tag}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoodMenu {
    pub mood: String,
    #[serde(rename = "data", default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub count: u64,
}

// =============================================================================
// Restaurants
// =============================================================================

/// A partner restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub commission_pct: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestaurantList {
    #[serde(default)]
    pub data: Vec<Restaurant>,
}

// =============================================================================
// Orders
// =============================================================================

/// The customer placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub telegram_user_id: TelegramUserId,
    pub name: String,
    pub phone: Phone,
}

/// Delivery and payment choices made at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub note: String,
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub user: Customer,
    pub items: Vec<CartItem>,
    pub subtotal: Price,
    pub discount: Price,
    pub delivery_cost: Price,
    pub total: Price,
    pub address: String,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub note: String,
    pub promo_code: String,
}

impl OrderRequest {
    /// Build an order from cart lines.
    ///
    /// The promo discount applies only when `promo` is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] for an empty cart, an invalid phone or an
    /// invalid delivery address.
    pub fn from_cart(
        items: &[CartItem],
        user_id: TelegramUserId,
        details: OrderDetails,
        promo: Option<&PromoValidation>,
    ) -> Result<Self, CheckoutError> {
        let phone = checkout::prepare(
            items,
            &details.phone,
            details.delivery_type,
            &details.address,
        )?;

        let promo = promo.filter(|p| p.valid);
        let summary = CheckoutSummary::calculate(
            items,
            details.delivery_type,
            promo.and_then(PromoValidation::discount),
        );

        Ok(Self {
            user: Customer {
                telegram_user_id: user_id,
                name: details.name.trim().to_string(),
                phone,
            },
            items: items.to_vec(),
            subtotal: summary.subtotal,
            discount: summary.discount,
            delivery_cost: summary.delivery_cost,
            total: summary.total,
            address: details.address.trim().to_string(),
            delivery_type: details.delivery_type,
            payment_method: details.payment_method,
            note: details.note,
            promo_code: promo.map(|p| p.code.clone()).unwrap_or_default(),
        })
    }

    /// Amounts carried by this order.
    #[must_use]
    pub const fn summary(&self) -> CheckoutSummary {
        CheckoutSummary {
            subtotal: self.subtotal,
            discount: self.discount,
            delivery_cost: self.delivery_cost,
            total: self.total,
        }
    }
}

/// Response to `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default = "default_eta")]
    pub eta_minutes: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
}

/// One row of a user's order history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    /// Creation time; `None` when the server value is missing or unreadable.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub total: Price,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub items_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderHistory {
    #[serde(default)]
    pub data: Vec<OrderSummary>,
}

// =============================================================================
// Promo codes
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct PromoRequest<'a> {
    pub code: &'a str,
}

/// Answer to `POST /promo/validate`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromoValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub code: String,
    #[serde(default)]
    pub discount_pct: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
}

impl PromoValidation {
    /// Discount percentage granted, if the code is valid.
    #[must_use]
    pub fn discount(&self) -> Option<Decimal> {
        if !self.valid {
            return None;
        }
        self.discount_pct
            .and_then(|pct| Decimal::try_from(pct).ok())
            .map(|pct| pct.normalize())
            .filter(|pct| pct.is_sign_positive() && !pct.is_zero())
    }
}

// =============================================================================
// Health
// =============================================================================

/// Response to `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub service: String,
}

// =============================================================================
// Helper Functions
// =============================================================================

const fn default_true() -> bool {
    true
}

const fn default_eta() -> u32 {
    checkout::DEFAULT_ETA_MINUTES
}

/// Read `null` as the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a string, a number (as its decimal text) or `null` (as empty).
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Read `"YYYY-MM-DD HH:MM:SS"` (or RFC 3339), ignoring anything else.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_datetime(&s)))
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;

    fn details() -> OrderDetails {
        OrderDetails {
            name: " Олена ".to_string(),
            phone: "050 123 45 67".to_string(),
            address: "вул. Хрещатик, 22".to_string(),
            delivery_type: DeliveryType::Delivery,
            payment_method: PaymentMethod::Card,
            note: "без цибулі".to_string(),
        }
    }

    fn promo(valid: bool, pct: Option<f64>) -> PromoValidation {
        PromoValidation {
            valid,
            code: "WELCOME10".to_string(),
            discount_pct: pct,
            message: String::new(),
        }
    }

    #[test]
    fn test_menu_item_from_sheet_row() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": 17,
            "category": "Піца",
            "name": "Маргарита",
            "description": null,
            "price": "185,50 грн",
            "restaurant": "Napoli",
            "time_delivery": 40,
            "photo_url": null,
            "active": true,
            "cook_time": null,
            "allergens": "глютен",
            "rating": 4.8,
            "mood_tags": ["party", "movie"]
        }))
        .unwrap();

        assert_eq!(item.id, ItemId::from(17_i64));
        assert_eq!(item.price, Price::from_kopiykas(18550));
        assert_eq!(item.description, "");
        assert_eq!(item.time_delivery, Some(40));
        assert_eq!(item.mood_tags, vec!["party", "movie"]);
    }

    #[test]
    fn test_menu_item_minimal() {
        let item: MenuItem = serde_json::from_value(json!({"id": "x1"})).unwrap();
        assert!(item.active);
        assert_eq!(item.price, Price::ZERO);
        assert!(item.mood_tags.is_empty());
    }

    #[test]
    fn test_menu_item_to_cart_item_carries_metadata() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": "p1", "name": "Pepperoni", "price": 210,
            "restaurant": "Napoli", "time_delivery": 35
        }))
        .unwrap();

        let line = item.to_cart_item();
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.name(), Some("Pepperoni"));
        assert_eq!(line.metadata()["restaurant"], "Napoli");
        assert_eq!(line.metadata()["time_delivery"], 35);
    }

    #[test]
    fn test_menu_filter_skips_unset_params() {
        let filter = MenuFilter::default().category("Суші").page(20, 40);
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value, json!({"category": "Суші", "limit": 20, "offset": 40}));
    }

    #[test]
    fn test_menu_page_reads_envelope() {
        let page: MenuPage = serde_json::from_value(json!({
            "ok": true,
            "data": [{"id": "a", "price": 10}],
            "total": 1, "limit": 100, "offset": 0
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_restaurant_numeric_fields_from_sheet() {
        let restaurant: Restaurant = serde_json::from_value(json!({
            "id": 3, "name": "Napoli", "category": "Піца", "rating": 4.7,
            "commission_pct": null, "status": "active", "phone": 380501234567_u64
        }))
        .unwrap();
        assert_eq!(restaurant.id, "3");
        assert_eq!(restaurant.phone, "380501234567");
        assert!(restaurant.commission_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_from_cart_applies_valid_promo() {
        let items = vec![
            CartItem::new("pizza", Price::from_hryvnia(150)).with_quantity(2),
        ];
        let promo = promo(true, Some(10.0));

        let order =
            OrderRequest::from_cart(&items, TelegramUserId::new(42), details(), Some(&promo))
                .unwrap();

        assert_eq!(order.user.phone.as_str(), "+380501234567");
        assert_eq!(order.user.name, "Олена");
        assert_eq!(order.subtotal, Price::from_hryvnia(300));
        assert_eq!(order.discount, Price::from_hryvnia(30));
        assert_eq!(order.delivery_cost, Price::ZERO);
        assert_eq!(order.total, Price::from_hryvnia(270));
        assert_eq!(order.promo_code, "WELCOME10");
    }

    #[test]
    fn test_order_from_cart_ignores_invalid_promo() {
        let items = vec![CartItem::new("cola", Price::from_hryvnia(40))];
        let promo = promo(false, Some(50.0));

        let order =
            OrderRequest::from_cart(&items, TelegramUserId::new(1), details(), Some(&promo))
                .unwrap();

        assert_eq!(order.discount, Price::ZERO);
        assert_eq!(order.delivery_cost, Price::from_hryvnia(50));
        assert_eq!(order.total, Price::from_hryvnia(90));
        assert!(order.promo_code.is_empty());
    }

    #[test]
    fn test_order_from_empty_cart_fails() {
        let result = OrderRequest::from_cart(&[], TelegramUserId::new(1), details(), None);
        assert_eq!(result.unwrap_err(), CheckoutError::EmptyCart);
    }

    #[test]
    fn test_order_request_wire_format() {
        let items = vec![CartItem::new("pizza", Price::from_hryvnia(120))];
        let mut details = details();
        details.delivery_type = DeliveryType::Pickup;

        let order = OrderRequest::from_cart(&items, TelegramUserId::new(7), details, None).unwrap();
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["user"]["telegram_user_id"], 7);
        assert_eq!(value["user"]["phone"], "+380501234567");
        assert_eq!(value["items"][0]["id"], "pizza");
        assert_eq!(value["items"][0]["quantity"], 1);
        assert_eq!(value["delivery_type"], "pickup");
        assert_eq!(value["payment_method"], "card");
        assert_eq!(value["total"], 120);
        assert_eq!(value["promo_code"], "");
    }

    #[test]
    fn test_order_confirmation_defaults_eta() {
        let confirmation: OrderConfirmation = serde_json::from_value(json!({
            "ok": true, "order_id": "ORD-1A2B", "status": "new", "message": null
        }))
        .unwrap();
        assert_eq!(confirmation.order_id.as_str(), "ORD-1A2B");
        assert_eq!(confirmation.eta_minutes, 30);
        assert!(confirmation.message.is_empty());
    }

    #[test]
    fn test_order_summary_parses_sheet_timestamp() {
        let row: OrderSummary = serde_json::from_value(json!({
            "order_id": "ORD-1", "created_at": "2024-05-01 18:30:00",
            "total": 290.0, "status": "delivered", "items_count": 3
        }))
        .unwrap();
        let created = row.created_at.unwrap();
        assert_eq!((created.month(), created.day(), created.hour()), (5, 1, 18));
        assert_eq!(row.total, Price::from_hryvnia(290));
    }

    #[test]
    fn test_order_summary_tolerates_bad_timestamp() {
        let row: OrderSummary = serde_json::from_value(json!({
            "order_id": "ORD-2", "created_at": "yesterday"
        }))
        .unwrap();
        assert!(row.created_at.is_none());
    }

    #[test]
    fn test_promo_discount_only_when_valid() {
        assert_eq!(promo(true, Some(15.0)).discount(), Some(Decimal::from(15)));
        assert_eq!(promo(false, Some(15.0)).discount(), None);
        assert_eq!(promo(true, None).discount(), None);
        assert_eq!(promo(true, Some(0.0)).discount(), None);
    }

    #[test]
    fn test_promo_negative_answer_parses() {
        let answer: PromoValidation = serde_json::from_value(json!({
            "ok": false, "valid": false, "message": "Промокод недійсний"
        }))
        .unwrap();
        assert!(!answer.valid);
        assert!(answer.discount().is_none());
        assert_eq!(answer.message, "Промокод недійсний");
    }
}
