//! Cache types for API responses.

use crate::types::{MenuFilter, MenuPage, MoodMenu, Restaurant};

/// Cache key for menu and restaurant lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Menu(MenuFilter),
    MoodMenu(String),
    Restaurants,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Menu(MenuPage),
    MoodMenu(MoodMenu),
    Restaurants(Vec<Restaurant>),
}
