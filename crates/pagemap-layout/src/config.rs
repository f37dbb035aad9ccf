//! Layout parameters.

use serde::{Deserialize, Serialize};

use crate::text::TextMetrics;

/// Spacing and text sizing parameters, in diagram units.
///
/// Deserializes from a partial table; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Advance of one character.
    pub char_width: f64,
    /// Height of one text line.
    pub line_height: f64,
    /// Labels longer than this are truncated with `...`.
    pub max_label_chars: usize,
    /// Body excerpt lines shown per section.
    pub excerpt_lines: usize,
    /// Horizontal gap between sibling subtrees.
    pub sibling_gap: f64,
    /// Vertical gap between rows of pages.
    pub level_gap: f64,
    /// Inner padding of page and section boxes.
    pub padding: f64,
    /// Horizontal indent per outline nesting step.
    pub indent: f64,
    /// Vertical gap between sibling sections.
    pub section_gap: f64,
    /// Smallest page box width.
    pub min_page_width: f64,
    /// Smallest page box height.
    pub min_page_height: f64,
    /// Width of unresolved markers.
    pub marker_width: f64,
    /// Height of unresolved markers.
    pub marker_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
            max_label_chars: 30,
            excerpt_lines: 2,
            sibling_gap: 24.0,
            level_gap: 48.0,
            padding: 8.0,
            indent: 12.0,
            section_gap: 6.0,
            min_page_width: 160.0,
            min_page_height: 48.0,
            marker_width: 160.0,
            marker_height: 40.0,
        }
    }
}

impl LayoutConfig {
    /// Text metric for these parameters.
    #[must_use]
    pub fn metrics(&self) -> TextMetrics {
        TextMetrics {
            char_width: self.char_width,
            line_height: self.line_height,
        }
    }

    /// Height of the title band at the top of a page box.
    #[must_use]
    pub fn title_band(&self) -> f64 {
        self.line_height + 2.0 * self.padding
    }
}
