//! Ferrik API client library.
//!
//! Typed access to the Ferrik REST API (`/api/v1`): menu, mood menu,
//! restaurants, orders and promo codes.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, JSON bodies in both directions
//! - One request per call, no retry or backoff
//! - In-memory caching via `moka` for menu and restaurant responses
//!   (5 minute TTL by default)
//! - Every response carries `{"ok": bool, ...}`; `ok: false` is surfaced as
//!   [`ApiError::Rejected`] except for promo validation, where it is a normal
//!   negative answer
//!
//! # Example
//!
//! ```rust,ignore
//! use ferrik_client::{ApiClient, ClientConfig, MenuFilter};
//!
//! let config = ClientConfig::from_env()?;
//! let client = ApiClient::new(&config)?;
//!
//! let menu = client.get_menu(&MenuFilter::default()).await?;
//! let spicy = client.get_mood_menu("spicy").await?;
//! let promo = client.validate_promo("WELCOME10").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::*;
