//! Cart state container.
//!
//! [`Cart`] owns the ordered list of [`CartItem`]s. Every mutation is applied
//! in place, written through the cart's [`CartStorage`] and then announced to
//! registered [`CartListener`]s. Aggregates (`subtotal`, `count`) are
//! computed from the list on every call and never stored.
//!
//! # Example
//!
//! ```
//! use ferrik_core::{Cart, CartItem, MemoryStore, Price};
//!
//! let mut cart = Cart::open(MemoryStore::new());
//! cart.add(CartItem::new("pizza", Price::from_hryvnia(120)));
//! cart.add(CartItem::new("cola", Price::from_hryvnia(20)).with_quantity(2));
//! cart.update("pizza", 3);
//!
//! assert_eq!(cart.subtotal(), Price::from_hryvnia(400));
//! assert_eq!(cart.count(), 5);
//! ```

mod item;

use std::fmt;
use std::num::NonZeroU32;

use tracing::debug;

pub use item::CartItem;

use crate::store::{CartStorage, KeyValueStore};
use crate::types::{ItemId, Price};

/// Receives the cart contents after every mutation.
///
/// Listeners get a shared slice and cannot change items; all changes go
/// through the cart operations. Any `FnMut(&[CartItem])` closure is a
/// listener.
pub trait CartListener {
    /// Called with the full item list after a mutation has been applied and
    /// persisted.
    fn on_change(&mut self, items: &[CartItem]);
}

impl<F: FnMut(&[CartItem])> CartListener for F {
    fn on_change(&mut self, items: &[CartItem]) {
        self(items);
    }
}

/// Shopping cart backed by a local key-value store.
pub struct Cart<S: KeyValueStore> {
    items: Vec<CartItem>,
    storage: CartStorage<S>,
    listeners: Vec<Box<dyn CartListener>>,
}

impl<S: KeyValueStore> Cart<S> {
    /// Open the cart saved in `store` under the default key.
    pub fn open(store: S) -> Self {
        Self::load(CartStorage::new(store))
    }

    /// Restore the cart from `storage`.
    ///
    /// A missing or unreadable saved cart starts empty. Saved lines sharing an
    /// id are merged so the one-line-per-id invariant holds from the start.
    #[must_use]
    pub fn load(storage: CartStorage<S>) -> Self {
        let mut items: Vec<CartItem> = Vec::new();
        for saved in storage.load() {
            merge_into(&mut items, saved);
        }

        Self {
            items,
            storage,
            listeners: Vec::new(),
        }
    }

    /// Add an item.
    ///
    /// If a line with the same id exists, its quantity grows by the incoming
    /// item's quantity. Otherwise the item is appended as a new line.
    pub fn add(&mut self, item: CartItem) {
        debug!(id = %item.id(), quantity = item.quantity(), "Adding to cart");
        merge_into(&mut self.items, item);
        self.commit();
    }

    /// Set the quantity of the line with `id`.
    ///
    /// A quantity of zero or less removes the line. Unknown ids leave the
    /// cart unchanged.
    pub fn update<Q>(&mut self, id: &Q, quantity: i64)
    where
        Q: ?Sized + fmt::Display,
        ItemId: PartialEq<Q>,
    {
        let Some(quantity) = u32::try_from(quantity.max(0))
            .map_or(NonZeroU32::new(u32::MAX), NonZeroU32::new)
        else {
            self.remove(id);
            return;
        };

        debug!(id = %id, quantity = quantity.get(), "Updating cart line");
        if let Some(line) = self.items.iter_mut().find(|i| i.id() == id) {
            line.set_quantity(quantity);
        }
        self.commit();
    }

    /// Remove the line with `id`, if present.
    pub fn remove<Q>(&mut self, id: &Q)
    where
        Q: ?Sized + fmt::Display,
        ItemId: PartialEq<Q>,
    {
        debug!(id = %id, "Removing cart line");
        self.items.retain(|i| i.id() != id);
        self.commit();
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        debug!("Clearing cart");
        self.items.clear();
        self.commit();
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line with `id`, if present.
    #[must_use]
    pub fn get<Q>(&self, id: &Q) -> Option<&CartItem>
    where
        Q: ?Sized,
        ItemId: PartialEq<Q>,
    {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        subtotal(&self.items)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        count(&self.items)
    }

    /// Register a listener notified after every mutation.
    pub fn subscribe(&mut self, listener: impl CartListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn commit(&mut self) {
        self.storage.save(&self.items);
        for listener in &mut self.listeners {
            listener.on_change(&self.items);
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for Cart<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("items", &self.items)
            .field("storage_key", &self.storage.key())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Sum of `price × quantity` over `items`.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}

/// Sum of quantities over `items`.
#[must_use]
pub fn count(items: &[CartItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity())).sum()
}

fn merge_into(items: &mut Vec<CartItem>, item: CartItem) {
    match items.iter_mut().find(|i| i.id() == item.id()) {
        Some(existing) => existing.increase_quantity(item.quantity_nonzero()),
        None => items.push(item),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::store::{CART_STORAGE_KEY, MemoryStore};

    fn pizza() -> CartItem {
        CartItem::new("pizza", Price::from_hryvnia(120)).with_name("Pizza")
    }

    fn cola() -> CartItem {
        CartItem::new("cola", Price::from_hryvnia(20)).with_name("Cola")
    }

    fn lines(cart: &Cart<impl KeyValueStore>) -> Vec<(String, u32)> {
        cart.items()
            .iter()
            .map(|i| (i.id().to_string(), i.quantity()))
            .collect()
    }

    #[test]
    fn test_order_flow_scenario() {
        let mut cart = Cart::open(MemoryStore::new());

        cart.add(pizza());
        cart.add(cola().with_quantity(2));
        cart.update("pizza", 3);
        assert_eq!(
            lines(&cart),
            vec![("pizza".to_string(), 3), ("cola".to_string(), 2)]
        );
        assert_eq!(cart.subtotal(), Price::from_hryvnia(400));
        assert_eq!(cart.count(), 5);

        cart.remove("cola");
        assert_eq!(lines(&cart), vec![("pizza".to_string(), 3)]);
        assert_eq!(cart.subtotal(), Price::from_hryvnia(360));
        assert_eq!(cart.count(), 3);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_add_existing_increments() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.add(pizza());
        assert_eq!(lines(&cart), vec![("pizza".to_string(), 2)]);

        cart.add(pizza().with_quantity(3));
        assert_eq!(cart.get("pizza").unwrap().quantity(), 5);
    }

    #[test]
    fn test_add_keeps_first_line_fields() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.add(CartItem::new("pizza", Price::from_hryvnia(999)).with_name("Other"));

        let line = cart.get("pizza").unwrap();
        assert_eq!(line.price(), Price::from_hryvnia(120));
        assert_eq!(line.name(), Some("Pizza"));
        assert_eq!(line.quantity(), 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.add(cola());
        cart.add(pizza());
        assert_eq!(
            lines(&cart),
            vec![("pizza".to_string(), 2), ("cola".to_string(), 1)]
        );
    }

    #[test]
    fn test_update_zero_matches_remove() {
        let mut updated = Cart::open(MemoryStore::new());
        updated.add(pizza());
        updated.add(cola());
        updated.update("pizza", 0);

        let mut removed = Cart::open(MemoryStore::new());
        removed.add(pizza());
        removed.add(cola());
        removed.remove("pizza");

        assert_eq!(updated.items(), removed.items());
    }

    #[test]
    fn test_update_negative_removes() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.update("pizza", -4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.update("sushi", 5);
        assert_eq!(lines(&cart), vec![("pizza".to_string(), 1)]);
    }

    #[test]
    fn test_update_clamps_huge_quantity() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.update("pizza", i64::MAX);
        assert_eq!(cart.get("pizza").unwrap().quantity(), u32::MAX);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.add(pizza());
        cart.remove("sushi");
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = Cart::open(Arc::clone(&store));

        let saved = || -> Vec<CartItem> {
            serde_json::from_str(&store.get(CART_STORAGE_KEY).unwrap().unwrap()).unwrap()
        };

        cart.add(pizza());
        assert_eq!(saved(), cart.items());

        cart.add(cola().with_quantity(2));
        assert_eq!(saved(), cart.items());

        cart.update("pizza", 3);
        assert_eq!(saved(), cart.items());

        cart.remove("cola");
        assert_eq!(saved(), cart.items());

        cart.clear();
        assert!(saved().is_empty());
    }

    #[test]
    fn test_reopen_restores_cart() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut cart = Cart::open(Arc::clone(&store));
            cart.add(pizza().with_quantity(2));
            cart.add(cola());
        }

        let cart = Cart::open(Arc::clone(&store));
        assert_eq!(
            lines(&cart),
            vec![("pizza".to_string(), 2), ("cola".to_string(), 1)]
        );
        assert_eq!(cart.get("pizza").unwrap().name(), Some("Pizza"));
    }

    #[test]
    fn test_open_with_corrupt_value_starts_empty() {
        let cart = Cart::open(MemoryStore::with_entry(CART_STORAGE_KEY, "[{]"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_open_merges_duplicate_saved_lines() {
        let store = MemoryStore::with_entry(
            CART_STORAGE_KEY,
            r#"[{"id":"pizza","price":120,"quantity":1},{"id":"cola","price":20,"quantity":1},{"id":"pizza","price":120,"quantity":2}]"#,
        );
        let cart = Cart::open(store);
        assert_eq!(
            lines(&cart),
            vec![("pizza".to_string(), 3), ("cola".to_string(), 1)]
        );
    }

    #[test]
    fn test_open_keeps_numeric_and_text_ids_apart() {
        let store = Arc::new(MemoryStore::with_entry(
            CART_STORAGE_KEY,
            r#"[{"id":1,"price":120,"quantity":1},{"id":"1","price":50,"quantity":1}]"#,
        ));
        let mut cart = Cart::open(Arc::clone(&store));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(), Price::from_hryvnia(170));
        assert_eq!(cart.get("1").unwrap().price(), Price::from_hryvnia(50));
        assert_eq!(
            cart.get(&ItemId::from(1_i64)).unwrap().price(),
            Price::from_hryvnia(120)
        );

        cart.update("1", 3);
        let saved: serde_json::Value =
            serde_json::from_str(&store.get(CART_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(
            saved,
            serde_json::json!([
                {"id": 1, "price": 120, "quantity": 1},
                {"id": "1", "price": 50, "quantity": 3}
            ])
        );
    }

    #[test]
    fn test_open_keeps_lines_with_any_name_value() {
        let raw = r#"[{"id":"pizza","price":120,"quantity":2,"name":{"uk":"Піца","en":"Pizza"}},{"id":"cola","price":20,"quantity":1,"name":"Cola"},{"id":"tea","price":15,"quantity":1,"name":null}]"#;
        let store = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, raw));
        let mut cart = Cart::open(Arc::clone(&store));

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.get("cola").unwrap().name(), Some("Cola"));
        assert_eq!(cart.get("pizza").unwrap().name(), None);

        cart.update("cola", 1);
        let saved: serde_json::Value =
            serde_json::from_str(&store.get(CART_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved, serde_json::from_str::<serde_json::Value>(raw).unwrap());
    }

    #[test]
    fn test_listeners_see_each_mutation() {
        let seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
        let mut cart = Cart::open(MemoryStore::new());

        let sink = Rc::clone(&seen);
        cart.subscribe(move |items: &[CartItem]| sink.borrow_mut().push(count(items)));

        cart.add(pizza());
        cart.add(cola().with_quantity(2));
        cart.remove("sushi");
        cart.clear();

        assert_eq!(*seen.borrow(), vec![1, 3, 3, 0]);
    }

    #[test]
    fn test_debug_hides_listeners() {
        let mut cart = Cart::open(MemoryStore::new());
        cart.subscribe(|_: &[CartItem]| {});
        let out = format!("{cart:?}");
        assert!(out.contains("ferrik_cart"));
        assert!(out.contains("listeners: 1"));
    }
}
