//! Checkout calculation.
//!
//! Turns a list of cart lines into the amounts shown before an order is
//! placed:
//!
//! - delivery is free from [`FREE_DELIVERY_THRESHOLD`] upward and costs
//!   [`DELIVERY_FEE`] below it; pickup never pays delivery
//! - a promo discount is a percentage of the subtotal, rounded half-up to
//!   kopiykas; the free-delivery threshold uses the undiscounted subtotal
//! - `total = subtotal - discount + delivery`

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::cart::{self, CartItem};
use crate::types::{DeliveryType, Phone, PhoneError, Price};

/// Subtotal (UAH) from which delivery is free.
pub const FREE_DELIVERY_THRESHOLD: u32 = 300;

/// Delivery fee (UAH) below the threshold.
pub const DELIVERY_FEE: u32 = 50;

/// ETA used when no line carries a delivery time.
pub const DEFAULT_ETA_MINUTES: u32 = 30;

/// Shortest accepted delivery address.
pub const MIN_ADDRESS_LENGTH: usize = 10;

/// Reasons an order cannot be placed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// The contact phone is not a valid number.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Delivery address is missing, too short or lacks a house number.
    #[error("Invalid delivery address: {0}")]
    InvalidAddress(String),
}

/// Amounts shown at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    /// Sum of line totals.
    pub subtotal: Price,
    /// Promo discount taken off the subtotal.
    pub discount: Price,
    /// Delivery fee.
    pub delivery_cost: Price,
    /// Amount to pay.
    pub total: Price,
}

impl CheckoutSummary {
    /// Compute the summary for `items`.
    ///
    /// `discount_pct` is the percentage granted by a validated promo code.
    #[must_use]
    pub fn calculate(
        items: &[CartItem],
        delivery: DeliveryType,
        discount_pct: Option<Decimal>,
    ) -> Self {
        let subtotal = cart::subtotal(items);
        let discount = discount_pct.map_or(Price::ZERO, |pct| subtotal.percent(pct));
        let delivery_cost = delivery_cost(subtotal, delivery);
        let total = subtotal.saturating_sub(discount) + delivery_cost;

        Self {
            subtotal,
            discount,
            delivery_cost,
            total,
        }
    }

    /// Returns true if the order ships without a delivery fee.
    #[must_use]
    pub fn free_delivery(&self) -> bool {
        self.delivery_cost.is_zero()
    }
}

/// Delivery fee for an undiscounted `subtotal`.
#[must_use]
pub fn delivery_cost(subtotal: Price, delivery: DeliveryType) -> Price {
    match delivery {
        DeliveryType::Pickup => Price::ZERO,
        DeliveryType::Delivery if subtotal >= Price::from_hryvnia(FREE_DELIVERY_THRESHOLD) => {
            Price::ZERO
        }
        DeliveryType::Delivery => Price::from_hryvnia(DELIVERY_FEE),
    }
}

/// Longest `time_delivery` (minutes) among `items`, or the default ETA.
#[must_use]
pub fn estimated_delivery_minutes(items: &[CartItem]) -> u32 {
    items
        .iter()
        .filter_map(|i| i.metadata().get("time_delivery"))
        .filter_map(serde_json::Value::as_u64)
        .filter_map(|m| u32::try_from(m).ok())
        .max()
        .unwrap_or(DEFAULT_ETA_MINUTES)
}

/// Validate a delivery address.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidAddress`] if the trimmed address is
/// shorter than [`MIN_ADDRESS_LENGTH`] characters or has no digit.
pub fn validate_address(address: &str) -> Result<(), CheckoutError> {
    let trimmed = address.trim();
    if trimmed.chars().count() < MIN_ADDRESS_LENGTH {
        return Err(CheckoutError::InvalidAddress(format!(
            "must be at least {MIN_ADDRESS_LENGTH} characters"
        )));
    }
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(CheckoutError::InvalidAddress(
            "must include a house number".to_string(),
        ));
    }
    Ok(())
}

/// Check everything that can be checked before sending an order.
///
/// Returns the normalized phone number.
///
/// # Errors
///
/// Returns an error for an empty cart, an invalid phone, or (for delivery
/// orders) an invalid address.
pub fn prepare(
    items: &[CartItem],
    phone: &str,
    delivery: DeliveryType,
    address: &str,
) -> Result<Phone, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let phone = Phone::parse(phone)?;
    if delivery == DeliveryType::Delivery {
        validate_address(address)?;
    }
    Ok(phone)
}
