//! sRGB color model used by the contrast engine.
//!
//! Colors are opaque 8-bit RGB triples. Parsing accepts the subset of CSS
//! color syntax that computed styles actually produce: hex, `rgb()`/`rgba()`
//! and the `transparent` keyword.

use palette::{convert::FromColorUnclamped, Lab, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum ratio for normal body text (WCAG AA).
pub const NORMAL_TEXT_RATIO: f64 = 4.5;
/// Minimum ratio for large text and UI component borders (WCAG AA).
pub const LARGE_TEXT_RATIO: f64 = 3.0;
/// Upper bound of the contrast ratio (black on white).
pub const MAX_CONTRAST_RATIO: f64 = 21.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    /// Replacement text color preferred over pure black.
    pub const NEAR_BLACK: Color = Color::new(17, 17, 17);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CIE L* of the color, in [0, 100].
    pub fn lightness(self) -> f32 {
        let srgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        let lab: Lab = Lab::from_color_unclamped(srgb);
        lab.l
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parses a CSS color string.
///
/// Returns `None` for anything outside the supported syntax; callers treat
/// that as "cannot evaluate" rather than an error. Alpha is discarded and
/// `transparent` maps to white since nothing is composited.
pub fn parse_color(css: &str) -> Option<Color> {
    let value = css.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = value.to_ascii_lowercase();
    if lower == "transparent" {
        return Some(Color::WHITE);
    }

    parse_rgb_function(&lower).map(|(color, _alpha)| color)
}

/// True for `transparent` and any `rgba()` value whose alpha is zero.
pub fn is_fully_transparent(css: &str) -> bool {
    let lower = css.trim().to_ascii_lowercase();
    if lower == "transparent" {
        return true;
    }
    matches!(parse_rgb_function(&lower), Some((_, Some(alpha))) if alpha <= 0.0)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Color::new(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::new(pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

fn parse_rgb_function(lower: &str) -> Option<(Color, Option<f32>)> {
    let inner = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let v: u32 = s.parse().ok()?;
        Some(v.min(255) as u8)
    };

    let color = Color::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    let alpha = match parts.get(3) {
        Some(a) => Some(a.parse::<f32>().ok().filter(|v| v.is_finite())?),
        None => None,
    };
    Some((color, alpha))
}

fn linearize(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= 0.03928 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance in [0, 1].
/// L = 0.2126 * R + 0.7152 * G + 0.0722 * B over linearized channels.
pub fn relative_luminance(color: Color) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// Contrast ratio (L1 + 0.05) / (L2 + 0.05) where L1 is the lighter color.
/// Symmetric in its arguments and always within [1, 21].
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Picks a text color for `background` that reaches `target_ratio`.
///
/// Near-black is tried before white. When neither reaches the target the
/// higher-contrast of the two is returned, so the result must be re-checked.
pub fn adjust_for_contrast(background: Color, target_ratio: f64) -> Color {
    let with_black = contrast_ratio(Color::NEAR_BLACK, background);
    let with_white = contrast_ratio(Color::WHITE, background);

    if with_black >= target_ratio {
        return Color::NEAR_BLACK;
    }
    if with_white >= target_ratio {
        return Color::WHITE;
    }

    if with_black > with_white {
        Color::NEAR_BLACK
    } else {
        Color::WHITE
    }
}
