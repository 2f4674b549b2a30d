//! Command implementations.
//!
//! Each command builds its output as a `String` and prints it once, so the
//! rendering can be tested without capturing stdout.

pub mod cart;
pub mod catalog;
pub mod order;

use ferrik_client::MenuItem;

/// Print command output.
#[allow(clippy::print_stdout)]
pub fn emit(output: &str) {
    println!("{output}");
}

/// One menu line: `[id] name, price (restaurant, N min)`.
pub(crate) fn render_menu_item(item: &MenuItem) -> String {
    let mut line = format!("[{}] {}, {}", item.id, display_name(&item.name), item.price);
    let mut extra = Vec::new();
    if !item.restaurant.is_empty() {
        extra.push(item.restaurant.clone());
    }
    if let Some(minutes) = item.time_delivery {
        extra.push(format!("{minutes} хв"));
    }
    if !extra.is_empty() {
        line.push_str(&format!(" ({})", extra.join(", ")));
    }
    if !item.active {
        line.push_str(" [недоступно]");
    }
    line
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "(без назви)" } else { name }
}
