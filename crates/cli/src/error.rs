//! CLI error type.

use ferrik_client::{ApiError, ConfigError};
use ferrik_core::{CheckoutError, StoreError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The order could not be built from the cart.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The cart store could not be opened.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// A requested menu item, mood or resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A command argument is invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
