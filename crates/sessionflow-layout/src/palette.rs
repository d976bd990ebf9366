//! Event-type color lookup with a required fallback.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fallback color for event types missing from the table.
pub const DEFAULT_FALLBACK_COLOR: &str = "#9e9e9e";

/// Colors for the event vocabulary of the research prototypes.
const DEFAULT_COLORS: &[(&str, &str)] = &[
    ("session_start", "#4caf50"),
    ("session_end", "#f44336"),
    ("page_view", "#2196f3"),
    ("post_view", "#03a9f4"),
    ("upvote", "#ff9800"),
    ("downvote", "#795548"),
    ("vote", "#ffc107"),
    ("comment", "#9c27b0"),
    ("search", "#00bcd4"),
    ("navigate", "#3f51b5"),
    ("survey_open", "#8bc34a"),
    ("survey_answer", "#cddc39"),
    ("survey_submit", "#009688"),
    ("survey_dismiss", "#e91e63"),
];

/// Mapping from event type to display color.
///
/// Lookups never fail: unknown types get [`ColorTable::fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTable {
    pub fallback: String,
    pub colors: BTreeMap<String, String>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK_COLOR.to_owned(),
            colors: DEFAULT_COLORS
                .iter()
                .map(|(kind, color)| ((*kind).to_owned(), (*color).to_owned()))
                .collect(),
        }
    }
}

impl ColorTable {
    /// An empty table that maps every type to `fallback`.
    pub fn with_fallback(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            colors: BTreeMap::new(),
        }
    }

    /// Add or replace the color for `kind`.
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(kind.into(), color.into());
        self
    }

    /// Color for `kind`, or the fallback when it has no entry.
    pub fn color_for(&self, kind: &str) -> &str {
        self.colors
            .get(kind)
            .map_or(self.fallback.as_str(), String::as_str)
    }

    /// Returns true if `kind` has an explicit entry.
    pub fn contains(&self, kind: &str) -> bool {
        self.colors.contains_key(kind)
    }
}
