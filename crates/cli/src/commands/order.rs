//! Order and promo code commands.
//!
//! # Usage
//!
//! ```bash
//! # Check a promo code
//! ferrik promo WELCOME10
//!
//! # Place an order for the current cart
//! ferrik order submit -u 42 -n "Олена" -p 0501234567 -a "вул. Хрещатик, 22" --promo WELCOME10
//!
//! # Order history
//! ferrik orders 42 --limit 5
//! ```

use std::fmt::Write as _;

use ferrik_client::{
    ApiClient, OrderConfirmation, OrderDetails, OrderRequest, OrderSummary, PromoValidation,
};
use ferrik_core::{Cart, KeyValueStore, TelegramUserId};

use super::emit;
use crate::error::CliError;

/// Check a promo code and print the answer.
pub async fn promo(client: &ApiClient, code: &str) -> Result<(), CliError> {
    let answer = client.validate_promo(code).await?;
    emit(&render_promo(&answer));
    Ok(())
}

/// Submit the cart as an order; the cart is cleared once the order is accepted.
pub async fn submit<S: KeyValueStore>(
    cart: &mut Cart<S>,
    client: &ApiClient,
    user_id: TelegramUserId,
    details: OrderDetails,
    promo_code: Option<&str>,
) -> Result<(), CliError> {
    let promo = match promo_code {
        Some(code) => {
            let answer = client.validate_promo(code).await?;
            if !answer.valid {
                return Err(CliError::InvalidArgument(render_promo(&answer)));
            }
            Some(answer)
        }
        None => None,
    };

    let order = OrderRequest::from_cart(cart.items(), user_id, details, promo.as_ref())?;
    tracing::info!(
        user_id = %user_id,
        items = order.items.len(),
        total = %order.total,
        "Submitting order"
    );

    let confirmation = client.create_order(&order).await?;
    cart.clear();

    emit(&render_confirmation(&order, &confirmation));
    Ok(())
}

/// Print a user's recent orders.
pub async fn history(
    client: &ApiClient,
    user_id: TelegramUserId,
    limit: Option<u32>,
) -> Result<(), CliError> {
    let orders = client.get_user_orders(user_id, limit).await?;
    emit(&render_history(&orders));
    Ok(())
}

fn render_promo(answer: &PromoValidation) -> String {
    match (answer.valid, answer.discount()) {
        (true, Some(pct)) => format!("Промокод {}: знижка {pct}%", answer.code),
        (true, None) => format!("Промокод {} дійсний", answer.code),
        (false, _) if answer.message.is_empty() => "Промокод недійсний".to_string(),
        (false, _) => answer.message.clone(),
    }
}

fn render_confirmation(order: &OrderRequest, confirmation: &OrderConfirmation) -> String {
    let summary = order.summary();
    let mut out = format!("Замовлення {} прийнято\n", confirmation.order_id);
    let _ = writeln!(out, "Сума: {}", summary.subtotal);
    if !summary.discount.is_zero() {
        let _ = writeln!(out, "Знижка: -{}", summary.discount);
    }
    let _ = writeln!(out, "Доставка: {}", summary.delivery_cost);
    let _ = writeln!(out, "До сплати: {}", summary.total);
    let _ = write!(out, "Очікуйте за ~{} хв", confirmation.eta_minutes);
    if !confirmation.message.is_empty() {
        let _ = write!(out, "\n{}", confirmation.message);
    }
    out
}

fn render_history(orders: &[OrderSummary]) -> String {
    if orders.is_empty() {
        return "Замовлень ще немає".to_string();
    }
    orders
        .iter()
        .map(|o| {
            let created = o
                .created_at
                .map_or_else(|| "-".to_string(), |t| t.format("%d.%m.%Y %H:%M").to_string());
            format!(
                "{} {created} {} ({} поз.) {}",
                o.order_id, o.total, o.items_count, o.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
