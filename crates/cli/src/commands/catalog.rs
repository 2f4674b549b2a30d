//! Read-only catalog commands: health, moods, menu and restaurants.
//!
//! # Usage
//!
//! ```bash
//! ferrik health
//! ferrik moods
//! ferrik mood spicy
//! ferrik menu --category "Піца" --limit 20
//! ferrik restaurants
//! ```

use std::fmt::Write as _;

use ferrik_client::{ApiClient, HealthStatus, MenuFilter, Restaurant};
use ferrik_core::{MOODS, Mood, MoodSelector};

use super::{emit, render_menu_item};
use crate::error::CliError;

/// Report API health.
pub async fn health(client: &ApiClient) -> Result<(), CliError> {
    let status = client.health().await?;
    emit(&render_health(client.base_url(), &status));
    Ok(())
}

/// List the mood catalog.
pub fn moods() {
    emit(&render_moods(&MOODS));
}

/// Show the dishes for a mood.
pub async fn mood(client: &ApiClient, tag: &str) -> Result<(), CliError> {
    let mut picked = None;
    MoodSelector::new(|m: &'static Mood| picked = Some(m)).select(tag);
    let mood = picked.ok_or_else(|| {
        let known: Vec<_> = MOODS.iter().map(|m| m.id).collect();
        CliError::NotFound(format!("mood '{tag}' (known: {})", known.join(", ")))
    })?;

    let menu = client.get_mood_menu(mood.id).await?;

    let mut out = format!("{} {}: {}\n", mood.emoji, mood.title, mood.description);
    if menu.items.is_empty() {
        out.push_str("Немає страв для цього настрою");
    }
    for item in &menu.items {
        let _ = writeln!(out, "  {}", render_menu_item(item));
    }
    emit(out.trim_end());
    Ok(())
}

/// Show a page of the menu.
pub async fn menu(client: &ApiClient, filter: &MenuFilter) -> Result<(), CliError> {
    let page = client.get_menu(filter).await?;

    let mut out = String::new();
    for item in &page.items {
        let _ = writeln!(out, "{}", render_menu_item(item));
    }
    let _ = write!(
        out,
        "Показано {} з {} (offset {})",
        page.items.len(),
        page.total,
        page.offset
    );
    emit(&out);
    Ok(())
}

/// List partner restaurants.
pub async fn restaurants(client: &ApiClient) -> Result<(), CliError> {
    let restaurants = client.get_restaurants().await?;
    emit(&render_restaurants(&restaurants));
    Ok(())
}

fn render_health(base: &str, status: &HealthStatus) -> String {
    let state = if status.ok { "up" } else { "down" };
    format!("{base}: {state} ({} {})", status.service, status.status)
}

fn render_moods(moods: &[Mood]) -> String {
    moods
        .iter()
        .map(|m| format!("{} {:<9} {}: {}", m.emoji, m.id, m.title, m.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_restaurants(restaurants: &[Restaurant]) -> String {
    if restaurants.is_empty() {
        return "Немає ресторанів".to_string();
    }
    restaurants
        .iter()
        .map(|r| {
            format!(
                "[{}] {} ({}), рейтинг {:.1}, {}",
                r.id, r.name, r.category, r.rating, r.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
