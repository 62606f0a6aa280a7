//! DOM snapshot types for captured pages.
//!
//! A snapshot is a flat list of nodes linked by string ids. It is the
//! interchange format read by the CLI and written back after remediation, so
//! forced overrides and remediation markers round-trip through it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::core::{BoundingBox, StyleOverrides};

/// A snapshot of a web page's DOM structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshot {
    /// The URL of the captured page
    pub url: Option<String>,
    /// The page title
    pub title: Option<String>,
    /// Flattened list of DOM nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<DomNode>,
}

/// A single DOM element with its properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    /// Unique identifier for this node
    pub id: String,
    /// HTML tag name (e.g., "div", "span", "button")
    pub tag: String,
    /// IDs of child nodes, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// ID of parent node
    pub parent: Option<String>,
    /// HTML attributes (id, class, data-*, etc.)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    /// Own text content, excluding descendants
    pub text: Option<String>,
    /// Position and size on screen
    #[serde(default)]
    pub bounding_box: BoundingBox,
    /// CSS computed styles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_style: Option<ComputedStyle>,
    /// Forced inline overrides written by remediation
    #[serde(default, skip_serializing_if = "StyleOverrides::is_empty")]
    pub inline_style: StyleOverrides,
    /// Set on nodes touched by a remediation pass
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub remediated: bool,
}

/// Computed CSS styles for a DOM element.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub opacity: Option<f32>,
}

impl ComputedStyle {
    /// Numeric font weight; keywords map to their CSS equivalents.
    pub fn font_weight_value(&self) -> u16 {
        match self.font_weight.as_deref().map(str::trim) {
            None | Some("") => 400,
            Some(w) if w.eq_ignore_ascii_case("normal") => 400,
            Some(w) if w.eq_ignore_ascii_case("lighter") => 300,
            Some(w) if w.eq_ignore_ascii_case("bold") || w.eq_ignore_ascii_case("bolder") => 700,
            Some(w) => w.parse::<f32>().map(|v| v.round() as u16).unwrap_or(400),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight_value() >= 700
    }

    /// False for `display: none`, `visibility: hidden|collapse` and zero opacity.
    pub fn is_rendered(&self) -> bool {
        let hidden_visibility = self.visibility.as_deref().is_some_and(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("hidden") || v.eq_ignore_ascii_case("collapse")
        });
        !(self.hides_subtree() || hidden_visibility)
    }

    /// True when nothing below this element can paint, whatever the
    /// descendants declare. `visibility` is not included since a child may
    /// set it back to `visible`.
    pub fn hides_subtree(&self) -> bool {
        let hidden_display = self
            .display
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("none"));
        let transparent = self.opacity.is_some_and(|o| o <= 0.0);
        hidden_display || transparent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(w: &str) -> u16 {
        ComputedStyle {
            font_weight: Some(w.to_string()),
            ..Default::default()
        }
        .font_weight_value()
    }

    #[test]
    fn font_weight_parses_keywords_and_numbers() {
        assert_eq!(weight("normal"), 400);
        assert_eq!(weight("bold"), 700);
        assert_eq!(weight("BOLDER"), 700);
        assert_eq!(weight("600"), 600);
        assert_eq!(weight("700.0"), 700);
        assert_eq!(weight("heavy"), 400);
        assert_eq!(ComputedStyle::default().font_weight_value(), 400);
    }

    #[test]
    fn hidden_styles_are_not_rendered() {
        let none = ComputedStyle {
            display: Some("none".into()),
            ..Default::default()
        };
        let hidden = ComputedStyle {
            visibility: Some("hidden".into()),
            ..Default::default()
        };
        let invisible = ComputedStyle {
            opacity: Some(0.0),
            ..Default::default()
        };
        assert!(!none.is_rendered());
        assert!(!hidden.is_rendered());
        assert!(!invisible.is_rendered());
        assert!(ComputedStyle::default().is_rendered());
    }

    #[test]
    fn snapshot_deserializes_camel_case() {
        let json = r##"{
            "url": "https://example.com",
            "nodes": [{
                "id": "n1",
                "tag": "p",
                "parent": null,
                "text": "Hi",
                "boundingBox": {"x": 1, "y": 2, "width": 3, "height": 4},
                "computedStyle": {"color": "#fff", "backgroundColor": "rgb(255, 255, 0)", "fontSize": 16}
            }]
        }"##;
        let snap: DomSnapshot = serde_json::from_str(json).expect("valid snapshot");
        let node = &snap.nodes[0];
        assert_eq!(node.bounding_box.height, 4.0);
        let style = node.computed_style.as_ref().expect("style");
        assert_eq!(style.background_color.as_deref(), Some("rgb(255, 255, 0)"));
        assert_eq!(style.font_size, Some(16.0));
        assert!(!node.remediated);
        assert!(node.inline_style.is_empty());
    }

    #[test]
    fn unremediated_node_omits_marker_fields() {
        let node = DomNode {
            id: "a".into(),
            tag: "div".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&node).expect("serialize");
        assert!(!json.contains("remediated"));
        assert!(!json.contains("inlineStyle"));
    }
}
