//! Best-effort cart persistence.
//!
//! The cart is written as one JSON array under a single key. Persistence is
//! an optimization, not a system of record: a missing or unreadable value
//! loads as an empty cart, and a failed write leaves the in-memory cart
//! authoritative for the rest of the session.

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::cart::CartItem;

/// Key under which the cart is stored.
pub const CART_STORAGE_KEY: &str = "ferrik_cart";

/// Reads and writes the cart sequence through a [`KeyValueStore`].
#[derive(Debug)]
pub struct CartStorage<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartStorage<S> {
    /// Create an adapter using [`CART_STORAGE_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, CART_STORAGE_KEY)
    }

    /// Create an adapter using a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The key this adapter reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the last saved cart.
    ///
    /// Never fails: a missing key, a read error or malformed JSON all yield
    /// an empty sequence.
    #[must_use]
    pub fn load(&self) -> Vec<CartItem> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No saved cart");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read saved cart");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => {
                debug!(key = %self.key, lines = items.len(), "Loaded saved cart");
                items
            }
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = %e,
                    raw = %raw.chars().take(200).collect::<String>(),
                    "Discarding unreadable saved cart"
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the saved cart with `items`.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn save(&self, items: &[CartItem]) {
        let serialized = match serde_json::to_string(items) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &serialized) {
            warn!(key = %self.key, error = %e, "Failed to save cart");
        }
    }
}
