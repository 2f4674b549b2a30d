//! Cart commands.
//!
//! The cart lives in the file store under the data directory and is shared
//! by every invocation.
//!
//! # Usage
//!
//! ```bash
//! # Add a dish from the menu
//! ferrik cart add p1 -q 2
//!
//! # Add a line by hand (no menu lookup)
//! ferrik cart add custom-1 --price 95 --name "Борщ"
//!
//! ferrik cart update p1 3
//! ferrik cart remove p1
//! ferrik cart show
//! ferrik cart clear
//! ```

use std::fmt::Write as _;

use ferrik_client::{ApiClient, MenuFilter};
use ferrik_core::checkout::{self, CheckoutSummary};
use ferrik_core::{Cart, CartItem, DeliveryType, ItemId, KeyValueStore, Price};

use super::emit;
use crate::error::CliError;

/// Page size used when looking an item up on the menu.
const MENU_LOOKUP_LIMIT: u32 = 500;

/// A line to add when the dish is not taken from the menu.
#[derive(Debug, Clone, Default)]
pub struct ManualLine {
    pub price: Option<String>,
    pub name: Option<String>,
}

/// Open the cart and log every change.
pub fn open<S: KeyValueStore>(store: S) -> Cart<S> {
    let mut cart = Cart::open(store);
    cart.subscribe(|items: &[CartItem]| {
        tracing::debug!(
            lines = items.len(),
            count = ferrik_core::cart::count(items),
            "Cart changed"
        );
    });
    cart
}

/// Print the cart.
pub fn show<S: KeyValueStore>(cart: &Cart<S>) {
    emit(&render_cart(cart.items()));
}

/// Add a dish, looking it up on the menu unless a price is given.
pub async fn add<S: KeyValueStore>(
    cart: &mut Cart<S>,
    client: &ApiClient,
    id: &str,
    quantity: u32,
    manual: ManualLine,
) -> Result<(), CliError> {
    if quantity == 0 {
        return Err(CliError::InvalidArgument("quantity must be at least 1".to_string()));
    }

    let item = if let Some(price) = manual.price {
        let price = Price::parse_lenient(&price)
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        let mut item = CartItem::new(id, price);
        if let Some(name) = manual.name {
            item = item.with_name(name);
        }
        item
    } else {
        let filter = MenuFilter::default().page(MENU_LOOKUP_LIMIT, 0);
        let page = client.get_menu(&filter).await?;
        let found = find_typed(page.items.as_slice(), |m| &m.id, id)
            .ok_or_else(|| CliError::NotFound(format!("menu item '{id}'")))?;
        if !found.active {
            return Err(CliError::InvalidArgument(format!(
                "menu item '{id}' is not available"
            )));
        }
        found.to_cart_item()
    };

    tracing::info!(id, quantity, "Adding to cart");
    cart.add(item.with_quantity(quantity));
    show(cart);
    Ok(())
}

/// Set the quantity of a line; zero or less removes it.
pub fn update<S: KeyValueStore>(cart: &mut Cart<S>, id: &str, quantity: i64) -> Result<(), CliError> {
    match line_id(cart, id) {
        Some(line) => cart.update(&line, quantity),
        None if quantity > 0 => return Err(CliError::NotFound(format!("cart line '{id}'"))),
        None => cart.remove(id),
    }
    show(cart);
    Ok(())
}

/// Remove a line.
pub fn remove<S: KeyValueStore>(cart: &mut Cart<S>, id: &str) {
    match line_id(cart, id) {
        Some(line) => cart.remove(&line),
        None => cart.remove(id),
    }
    show(cart);
}

/// Id of the cart line matching what was typed on the command line.
fn line_id<S: KeyValueStore>(cart: &Cart<S>, typed: &str) -> Option<ItemId> {
    find_typed(cart.items(), CartItem::id, typed).map(|line| line.id().clone())
}

/// A text id equal to `typed` wins over a numeric id that prints the same.
fn find_typed<'a, T>(
    entries: &'a [T],
    id_of: impl Fn(&'a T) -> &'a ItemId,
    typed: &str,
) -> Option<&'a T> {
    entries
        .iter()
        .find(|&e| *id_of(e) == *typed)
        .or_else(|| entries.iter().find(|&e| id_of(e).to_string() == typed))
}

/// Empty the cart.
pub fn clear<S: KeyValueStore>(cart: &mut Cart<S>) {
    cart.clear();
    emit("Кошик порожній");
}

/// Cart lines followed by the checkout totals for delivery.
pub fn render_cart(items: &[CartItem]) -> String {
    if items.is_empty() {
        return "Кошик порожній".to_string();
    }

    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{} × {} [{}]  {}",
            item.quantity(),
            item.name().unwrap_or("(без назви)"),
            item.id(),
            item.line_total()
        );
    }

    let summary = CheckoutSummary::calculate(items, DeliveryType::Delivery, None);
    let _ = writeln!(out, "Позицій: {}", ferrik_core::cart::count(items));
    let _ = writeln!(out, "Сума: {}", summary.subtotal);
    if summary.free_delivery() {
        let _ = writeln!(out, "Доставка: безкоштовно");
    } else {
        let _ = writeln!(
            out,
            "Доставка: {} (безкоштовно від {} грн)",
            summary.delivery_cost,
            checkout::FREE_DELIVERY_THRESHOLD
        );
    }
    let _ = writeln!(out, "До сплати: {}", summary.total);
    let _ = write!(
        out,
        "Орієнтовний час доставки: {} хв",
        checkout::estimated_delivery_minutes(items)
    );
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use ferrik_core::MemoryStore;

    use super::*;

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&[]), "Кошик порожній");
    }

    #[test]
    fn test_render_cart_below_free_delivery() {
        let items = vec![
            CartItem::new("p1", Price::from_hryvnia(120))
                .with_name("Маргарита")
                .with_quantity(2)
                .with_metadata("time_delivery", 40),
        ];
        let out = render_cart(&items);
        assert!(out.contains("2 × Маргарита [p1]  240.00 грн"));
        assert!(out.contains("Сума: 240.00 грн"));
        assert!(out.contains("Доставка: 50.00 грн"));
        assert!(out.contains("До сплати: 290.00 грн"));
        assert!(out.ends_with("40 хв"));
    }

    #[test]
    fn test_render_cart_free_delivery() {
        let items = vec![CartItem::new("set", Price::from_hryvnia(450))];
        let out = render_cart(&items);
        assert!(out.contains("Доставка: безкоштовно"));
        assert!(out.contains("До сплати: 450.00 грн"));
    }

    #[test]
    fn test_update_unknown_line_is_not_found() {
        let mut cart = open(MemoryStore::new());
        assert!(matches!(
            update(&mut cart, "ghost", 2),
            Err(CliError::NotFound(_))
        ));
        assert!(update(&mut cart, "ghost", 0).is_ok());
    }

    #[test]
    fn test_update_and_remove_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = open(Arc::clone(&store));
        cart.add(CartItem::new("p1", Price::from_hryvnia(100)));

        update(&mut cart, "p1", 4).unwrap();
        assert_eq!(open(Arc::clone(&store)).count(), 4);

        remove(&mut cart, "p1");
        assert!(open(Arc::clone(&store)).is_empty());
    }

    #[test]
    fn test_typed_id_matches_numeric_line() {
        let store = Arc::new(MemoryStore::with_entry(
            ferrik_core::CART_STORAGE_KEY,
            r#"[{"id":7,"price":45,"quantity":1},{"id":"p1","price":100,"quantity":1}]"#,
        ));
        let mut cart = open(Arc::clone(&store));

        update(&mut cart, "7", 3).unwrap();
        assert_eq!(cart.get(&ItemId::from(7_i64)).unwrap().quantity(), 3);

        remove(&mut cart, "7");
        assert_eq!(cart.len(), 1);
        assert!(cart.get("p1").is_some());
    }

    #[test]
    fn test_typed_id_prefers_text_line() {
        let mut cart = open(MemoryStore::with_entry(
            ferrik_core::CART_STORAGE_KEY,
            r#"[{"id":1,"price":120,"quantity":1},{"id":"1","price":50,"quantity":1}]"#,
        ));

        update(&mut cart, "1", 4).unwrap();
        assert_eq!(cart.get("1").unwrap().quantity(), 4);
        assert_eq!(cart.get(&ItemId::from(1_i64)).unwrap().quantity(), 1);
    }

    #[tokio::test]
    async fn test_manual_add_skips_menu_lookup() {
        let client = ApiClient::new(&ferrik_client::ClientConfig::hosted().unwrap()).unwrap();
        let mut cart = open(MemoryStore::new());
        let manual = ManualLine {
            price: Some("95,50 грн".to_string()),
            name: Some("Борщ".to_string()),
        };

        add(&mut cart, &client, "borshch", 2, manual).await.unwrap();

        let line = cart.get("borshch").unwrap();
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.price(), Price::from_kopiykas(9550));
        assert_eq!(line.name(), Some("Борщ"));
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let client = ApiClient::new(&ferrik_client::ClientConfig::hosted().unwrap()).unwrap();
        let mut cart = open(MemoryStore::new());
        let result = add(&mut cart, &client, "p1", 0, ManualLine::default()).await;
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
        assert!(cart.is_empty());
    }
}
