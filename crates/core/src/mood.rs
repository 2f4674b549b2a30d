//! Mood catalog.
//!
//! The home screen offers a carousel of moods; picking one loads the menu
//! items tagged with that mood. This module holds the catalog and the
//! selection callback. Rendering lives with the view.

use serde::Serialize;

/// A selectable mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mood {
    /// Tag sent to the mood menu endpoint.
    pub id: &'static str,
    /// Card emoji.
    pub emoji: &'static str,
    /// Card title.
    pub title: &'static str,
    /// Card subtitle.
    pub description: &'static str,
}

/// Moods in display order.
pub static MOODS: [Mood; 6] = [
    Mood {
        id: "calm",
        emoji: "😌",
        title: "Спокійний вечір",
        description: "Легка їжа для розслаблення",
    },
    Mood {
        id: "energy",
        emoji: "⚡",
        title: "Енергія!",
        description: "Поживні страви для сили",
    },
    Mood {
        id: "party",
        emoji: "🥳",
        title: "Party Time",
        description: "Сети для компанії",
    },
    Mood {
        id: "romantic",
        emoji: "❤️",
        title: "Романтика",
        description: "Особливий вечір удвох",
    },
    Mood {
        id: "movie",
        emoji: "🧊",
        title: "Кіно + перекус",
        description: "Снеки та напої",
    },
    Mood {
        id: "spicy",
        emoji: "🔥",
        title: "Very Spicy",
        description: "Гостренького!",
    },
];

impl Mood {
    /// Look up a mood by id, ignoring ASCII case.
    #[must_use]
    pub fn find(id: &str) -> Option<&'static Self> {
        let id = id.trim();
        MOODS.iter().find(|m| m.id.eq_ignore_ascii_case(id))
    }

    /// All moods in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &MOODS
    }
}

/// Dispatches mood selections to a callback.
pub struct MoodSelector<F: FnMut(&'static Mood)> {
    on_select: F,
}

impl<F: FnMut(&'static Mood)> MoodSelector<F> {
    /// Create a selector that calls `on_select` for each valid selection.
    pub const fn new(on_select: F) -> Self {
        Self { on_select }
    }

    /// Moods to render, in display order.
    #[must_use]
    pub fn moods(&self) -> &'static [Mood] {
        Mood::all()
    }

    /// Select the mood with `id`.
    ///
    /// Returns false and skips the callback when the id is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        match Mood::find(id) {
            Some(mood) => {
                (self.on_select)(mood);
                true
            }
            None => {
                tracing::debug!(id, "Ignoring unknown mood");
                false
            }
        }
    }
}
