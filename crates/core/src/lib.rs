//! Ferrik Core - Cart state and shared types.
//!
//! This crate provides the client-side pieces of the Ferrik food-ordering
//! application that do not talk to the network:
//! - `client` - REST API client (separate crate)
//! - `cli` - Command-line front end (separate crate)
//!
//! # Architecture
//!
//! The cart is an owned state container. Every mutation is written through a
//! [`CartStorage`] adapter to a synchronous [`KeyValueStore`], so the last
//! known cart survives a reload. Persistence is best-effort: a missing or
//! corrupt stored value loads as an empty cart, and failed writes are logged
//! and ignored.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for item IDs, prices, phone numbers and statuses
//! - [`cart`] - Cart line items and the cart state container
//! - [`store`] - Key-value store trait, in-memory store and the cart storage adapter
//! - [`checkout`] - Delivery, discount and total calculation
//! - [`mood`] - Mood catalog used for mood-based menu selection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod mood;
pub mod store;
pub mod types;

pub use cart::{Cart, CartItem, CartListener};
pub use checkout::{CheckoutError, CheckoutSummary};
pub use mood::{MOODS, Mood, MoodSelector};
pub use store::{CART_STORAGE_KEY, CartStorage, KeyValueStore, MemoryStore, StoreError};
pub use types::*;
