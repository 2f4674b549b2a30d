//! Newtype IDs for type-safe entity references.
//!
//! Numeric IDs are created with the `define_id!` macro. Menu item IDs are
//! opaque values issued by the menu sheet, either JSON strings or numbers,
//! and [`ItemId`] keeps whichever kind it was given.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use ferrik_core::define_id;
/// define_id!(CourierId);
/// define_id!(KitchenId);
///
/// let courier = CourierId::new(1);
/// let kitchen = KitchenId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: CourierId = kitchen;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Telegram user IDs exceed i32 range.
define_id!(TelegramUserId);

/// Identifier of a menu item, used as the cart merge key.
///
/// The menu sheet issues both text and numeric ids. The id keeps the JSON
/// kind it was read with and is written back the same way, so `1` and `"1"`
/// are different items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Id given as a JSON string.
    Text(String),
    /// Id given as a JSON number.
    Number(Number),
}

impl ItemId {
    /// Create a text item ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    /// Returns true for ids read from a JSON number.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self::Number(id.into())
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self::Number(id.into())
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Self::Text(s) if s == other)
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Order identifier returned by the order API (e.g. `ORD_20250101_120000_42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Create an order ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
