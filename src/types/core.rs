//! Core value types used throughout the library.
//!
//! - [`BoundingBox`] - on-screen element rectangle
//! - [`StyleOverrides`] - forced inline colors written by remediation

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Rectangle bounds for an element, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + 2.0 * amount,
            height: self.height + 2.0 * amount,
        }
    }
}

/// Highest-precedence inline color overrides applied to a single element.
///
/// Every set field is emitted as an `!important` declaration so it wins over
/// the page's own stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.background_color.is_none() && self.border_color.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Renders the overrides as an inline `style` attribute value.
    pub fn to_css(&self) -> String {
        let decls = [
            ("color", self.color),
            ("background-color", self.background_color),
            ("border-color", self.border_color),
        ];
        decls
            .iter()
            .filter_map(|(prop, value)| value.map(|c| format!("{prop}: {} !important;", c.to_hex())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
