//! Cart line items.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{ItemId, Price};

const ONE: NonZeroU32 = NonZeroU32::MIN;

const fn default_quantity() -> NonZeroU32 {
    ONE
}

/// One distinct product line in the cart.
///
/// Fields are read-only outside the cart: quantities change only through
/// [`Cart`](super::Cart) operations. Every JSON field besides `id`, `price`
/// and `quantity` (the display name included) is kept as-is in
/// [`metadata`](Self::metadata) and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    id: ItemId,
    price: Price,
    #[serde(default = "default_quantity")]
    quantity: NonZeroU32,
    #[serde(flatten)]
    metadata: Map<String, Value>,
}

impl CartItem {
    /// Create a line with quantity 1.
    pub fn new(id: impl Into<ItemId>, price: Price) -> Self {
        Self {
            id: id.into(),
            price,
            quantity: ONE,
            metadata: Map::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name: String = name.into();
        self.with_metadata("name", name)
    }

    /// Set the quantity. Zero is treated as 1.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = NonZeroU32::new(quantity).unwrap_or(ONE);
        self
    }

    /// Attach a passthrough metadata field.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Item identifier (the cart merge key).
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Display name, when the `name` field holds a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Value::as_str)
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Number of units, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Passthrough product metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity.get()
    }

    pub(crate) const fn quantity_nonzero(&self) -> NonZeroU32 {
        self.quantity
    }

    pub(crate) const fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }

    pub(crate) const fn increase_quantity(&mut self, by: NonZeroU32) {
        self.quantity = self.quantity.saturating_add(by.get());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_one() {
        let item = CartItem::new("pizza", Price::from_hryvnia(120));
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.name(), None);
    }

    #[test]
    fn test_zero_quantity_becomes_one() {
        let item = CartItem::new("pizza", Price::from_hryvnia(120)).with_quantity(0);
        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn test_line_total() {
        let item = CartItem::new("pizza", Price::from_hryvnia(120)).with_quantity(3);
        assert_eq!(item.line_total(), Price::from_hryvnia(360));
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let item: CartItem = serde_json::from_str(r#"{"id": "cola", "price": 20}"#).unwrap();
        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn test_passthrough_fields_survive() {
        let raw = r#"{"id":"1","name":"Маргарита","price":180,"quantity":2,"restaurant":"FerrikPizza","time_delivery":40}"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.id(), &ItemId::new("1"));
        assert_eq!(item.name(), Some("Маргарита"));
        assert_eq!(
            item.metadata().get("restaurant"),
            Some(&Value::from("FerrikPizza"))
        );

        let back: Value = serde_json::to_value(&item).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_numeric_id_and_string_price() {
        let item: CartItem =
            serde_json::from_str(r#"{"id": 7, "price": "45,5 грн", "quantity": 1}"#).unwrap();
        assert_eq!(item.id(), &ItemId::from(7_i64));
        assert_eq!(item.price(), Price::from_kopiykas(4550));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["id"], 7);
    }

    #[test]
    fn test_non_string_name_is_kept() {
        let raw = r#"{"id":"pizza","price":120,"quantity":2,"name":{"uk":"Піца","en":"Pizza"}}"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.name(), None);
        assert_eq!(item.metadata()["name"]["en"], "Pizza");

        let back: Value = serde_json::to_value(&item).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_null_name_is_written_back() {
        let raw = r#"{"id":"pizza","price":120,"quantity":2,"name":null}"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.name(), None);
        let back: Value = serde_json::to_value(&item).unwrap();
        assert_eq!(back["name"], Value::Null);
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_with_name_is_metadata() {
        let item = CartItem::new("pizza", Price::from_hryvnia(120)).with_name("Піца");
        assert_eq!(item.name(), Some("Піца"));
        assert_eq!(item.metadata().get("name"), Some(&Value::from("Піца")));
    }

    #[test]
    fn test_increase_quantity_saturates() {
        let mut item = CartItem::new("x", Price::ZERO).with_quantity(u32::MAX);
        item.increase_quantity(NonZeroU32::new(5).unwrap());
        assert_eq!(item.quantity(), u32::MAX);
    }
}
