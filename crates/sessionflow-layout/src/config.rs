#![forbid(unsafe_code)]

//! Layout configuration for the flow engine.
//!
//! [`LayoutConfig`] gathers every tunable of the layout as data so that it
//! can be loaded from TOML or JSON at startup:
//!
//! ```toml
//! # sessionflow.toml
//! canvas_height = 800.0
//! inter_node_gap = 16.0
//! start_type = "session_start"
//!
//! [level_bounds]
//! min = 2
//! max = 5
//!
//! [palette]
//! fallback = "#777777"
//!
//! [palette.colors]
//! vote = "#ffb300"
//! ```
//!
//! ```rust,ignore
//! let config = LayoutConfig::from_toml_file("sessionflow.toml")?.validated()?;
//! ```
//!
//! Missing fields take the values of [`LayoutConfig::default()`]. TOML has
//! no null, so `start_type = ""` (or `null` in JSON) turns boundary forcing
//! off.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette::ColorTable;

/// Inclusive bounds on the number of horizontal levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for LevelBounds {
    fn default() -> Self {
        Self { min: 2, max: 7 }
    }
}

impl LevelBounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Clamp `distinct` into the bounds.
    ///
    /// Never panics: if the bounds are inverted the upper bound wins.
    #[inline]
    pub fn level_count(&self, distinct: usize) -> usize {
        distinct.max(self.min).min(self.max)
    }
}

/// Tunables of the flow layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical extent of the layout, in abstract units.
    pub canvas_height: f64,
    /// Empty space above the first and below the last node of a level.
    pub top_bottom_padding: f64,
    /// Vertical gap between consecutive nodes of a level.
    pub inter_node_gap: f64,
    /// Floor for node heights.
    pub min_node_height: f64,
    /// Floor for link band widths.
    pub min_link_width: f64,
    /// Type forced to level 0, if any. Serialized as `""` when unset.
    #[serde(with = "boundary_label")]
    pub start_type: Option<String>,
    /// Type forced to the last level, if any. Serialized as `""` when unset.
    #[serde(with = "boundary_label")]
    pub end_type: Option<String>,
    /// Bounds on the number of horizontal levels.
    pub level_bounds: LevelBounds,
    /// Node and link colors.
    pub palette: ColorTable,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_height: 600.0,
            top_bottom_padding: 20.0,
            inter_node_gap: 12.0,
            min_node_height: 4.0,
            min_link_width: 1.0,
            start_type: Some("session_start".to_owned()),
            end_type: Some("session_end".to_owned()),
            level_bounds: LevelBounds::default(),
            palette: ColorTable::default(),
        }
    }
}

impl LayoutConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from disk, picking the format from the file extension.
    ///
    /// `.json` is parsed as JSON, anything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_toml_file(path)
        }
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.canvas_height.is_finite() || self.canvas_height <= 0.0 {
            errors.push(format!(
                "canvas_height must be finite and > 0, got {}",
                self.canvas_height
            ));
        }
        for (name, value) in [
            ("top_bottom_padding", self.top_bottom_padding),
            ("inter_node_gap", self.inter_node_gap),
            ("min_node_height", self.min_node_height),
            ("min_link_width", self.min_link_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be finite and >= 0, got {value}"));
            }
        }
        if self.canvas_height.is_finite()
            && self.top_bottom_padding.is_finite()
            && 2.0 * self.top_bottom_padding >= self.canvas_height
        {
            errors.push(format!(
                "top_bottom_padding ({}) leaves no usable height in canvas_height ({})",
                self.top_bottom_padding, self.canvas_height
            ));
        }
        if self.level_bounds.min == 0 {
            errors.push("level_bounds.min must be >= 1".to_owned());
        }
        if self.level_bounds.min > self.level_bounds.max {
            errors.push(format!(
                "level_bounds.min ({}) must not exceed level_bounds.max ({})",
                self.level_bounds.min, self.level_bounds.max
            ));
        }

        errors
    }

    /// Consume the config, returning it only if [`validate`](Self::validate)
    /// reports nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Height available for nodes once the top and bottom padding is removed.
    #[inline]
    pub fn usable_height(&self) -> f64 {
        (self.canvas_height - 2.0 * self.top_bottom_padding).max(0.0)
    }

    #[must_use]
    pub fn canvas_height(mut self, height: f64) -> Self {
        self.canvas_height = height;
        self
    }

    #[must_use]
    pub fn top_bottom_padding(mut self, padding: f64) -> Self {
        self.top_bottom_padding = padding;
        self
    }

    #[must_use]
    pub fn inter_node_gap(mut self, gap: f64) -> Self {
        self.inter_node_gap = gap;
        self
    }

    #[must_use]
    pub fn min_node_height(mut self, height: f64) -> Self {
        self.min_node_height = height;
        self
    }

    #[must_use]
    pub fn min_link_width(mut self, width: f64) -> Self {
        self.min_link_width = width;
        self
    }

    #[must_use]
    pub fn level_bounds(mut self, min: usize, max: usize) -> Self {
        self.level_bounds = LevelBounds::new(min, max);
        self
    }

    /// Set (or clear) the type forced to level 0.
    #[must_use]
    pub fn start_type(mut self, kind: Option<&str>) -> Self {
        self.start_type = boundary_label::normalize(kind);
        self
    }

    /// Set (or clear) the type forced to the last level.
    #[must_use]
    pub fn end_type(mut self, kind: Option<&str>) -> Self {
        self.end_type = boundary_label::normalize(kind);
        self
    }

    #[must_use]
    pub fn palette(mut self, palette: ColorTable) -> Self {
        self.palette = palette;
        self
    }
}

/// Optional boundary labels, with the empty string standing for "none".
mod boundary_label {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn normalize(label: Option<&str>) -> Option<String> {
        label.filter(|label| !label.is_empty()).map(str::to_owned)
    }

    pub(super) fn serialize<S>(label: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(label.as_deref().unwrap_or_default())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(normalize(label.as_deref()))
    }
}

/// Errors that can occur when loading a layout configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
