//! Adaptive contrast remediation ("auto-fix").
//!
//! A single synchronous pass over the tree. Each candidate element's text
//! color (and, for form controls, border color) is measured against its
//! effective background; failing colors are replaced with forced overrides
//! and the element is marked so later passes and reverts can find it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::background::effective_background;
use crate::color::{
    adjust_for_contrast, contrast_ratio, parse_color, Color, LARGE_TEXT_RATIO, NORMAL_TEXT_RATIO,
};
use crate::tree::{NodeAccess, NodeId, NodeMutate};
use crate::types::ComputedStyle;

/// Bold text at or above this size (14pt) counts as large.
pub const LARGE_BOLD_TEXT_PX: f32 = 18.66;
/// Text at or above this size (18pt) counts as large at any weight.
pub const LARGE_TEXT_PX: f32 = 24.0;
const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Minimum ratios; the `[contrast]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastThresholds {
    pub normal_text: f64,
    pub large_text: f64,
    pub ui_component: f64,
}

impl Default for ContrastThresholds {
    fn default() -> Self {
        Self {
            normal_text: NORMAL_TEXT_RATIO,
            large_text: LARGE_TEXT_RATIO,
            ui_component: LARGE_TEXT_RATIO,
        }
    }
}

impl ContrastThresholds {
    pub fn for_text(&self, style: &ComputedStyle) -> f64 {
        if is_large_text(style) {
            self.large_text
        } else {
            self.normal_text
        }
    }
}

pub fn is_large_text(style: &ComputedStyle) -> bool {
    let size = style.font_size.unwrap_or(DEFAULT_FONT_SIZE_PX);
    (style.is_bold() && size >= LARGE_BOLD_TEXT_PX) || size >= LARGE_TEXT_PX
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Text,
    Border,
}

/// One measured color pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastCheck {
    pub kind: CheckKind,
    pub foreground: Color,
    pub background: Color,
    pub ratio: f64,
    pub required: f64,
}

impl ContrastCheck {
    fn new(kind: CheckKind, foreground: Color, background: Color, required: f64) -> Self {
        Self {
            kind,
            foreground,
            background,
            ratio: contrast_ratio(foreground, background),
            required,
        }
    }

    pub fn passes(&self) -> bool {
        self.ratio >= self.required
    }
}

/// Measures `node` without changing anything.
///
/// Returns no checks for hidden nodes, textless non-control nodes, and nodes
/// whose colors cannot be parsed.
pub fn evaluate<T: NodeAccess>(
    tree: &T,
    node: NodeId,
    thresholds: &ContrastThresholds,
) -> Vec<ContrastCheck> {
    let mut checks = Vec::new();
    let Some(style) = tree.style(node) else {
        return checks;
    };
    if !style.is_rendered() || inside_hidden_subtree(tree, node) {
        return checks;
    }
    let interactive = tree.is_interactive(node);
    if !interactive && !tree.has_rendered_text(node) {
        return checks;
    }
    let Some(background) = effective_background(tree, node) else {
        return checks;
    };

    if let Some(fg) = style.color.as_deref().and_then(parse_color) {
        checks.push(ContrastCheck::new(
            CheckKind::Text,
            fg,
            background,
            thresholds.for_text(style),
        ));
    }

    if interactive {
        if let Some(border) = style.border_color.as_deref().and_then(parse_color) {
            checks.push(ContrastCheck::new(
                CheckKind::Border,
                border,
                background,
                thresholds.ui_component,
            ));
        }
    }

    checks
}

fn inside_hidden_subtree<T: NodeAccess>(tree: &T, node: NodeId) -> bool {
    tree.ancestors_inclusive(node)
        .skip(1)
        .any(|a| tree.style(a).is_some_and(ComputedStyle::hides_subtree))
}

/// Every failing check in the tree, in document order. Marked nodes are
/// measured with their forced colors applied.
pub fn audit<T: NodeAccess>(tree: &T, thresholds: &ContrastThresholds) -> Vec<(NodeId, ContrastCheck)> {
    tree.descendants()
        .flat_map(|node| {
            evaluate(tree, node, thresholds)
                .into_iter()
                .map(move |check| (node, effective_check(tree, node, check)))
        })
        .filter(|(_, check)| !check.passes())
        .collect()
}

fn effective_check<T: NodeAccess>(tree: &T, node: NodeId, check: ContrastCheck) -> ContrastCheck {
    let overrides = tree.overrides(node);
    let forced = match check.kind {
        CheckKind::Text => overrides.color,
        CheckKind::Border => overrides.border_color,
    };
    match forced {
        Some(fg) => ContrastCheck::new(check.kind, fg, check.background, check.required),
        None => check,
    }
}

/// Counters describing one remediation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationReport {
    pub visited: usize,
    pub evaluated: usize,
    pub already_remediated: usize,
    pub text_fixed: usize,
    pub background_forced: usize,
    pub border_fixed: usize,
}

impl RemediationReport {
    pub fn nodes_changed(&self) -> usize {
        self.text_fixed + self.border_fixed
    }
}

/// Rewrites failing colors in place.
///
/// Nodes already carrying the remediation marker are skipped, so running
/// the pass twice without a revert changes nothing the second time.
/// Pre-order visiting lets descendants see ancestors' forced backgrounds.
pub fn remediate<T: NodeMutate>(tree: &mut T, thresholds: &ContrastThresholds) -> RemediationReport {
    let mut report = RemediationReport::default();
    let order: Vec<NodeId> = tree.descendants().collect();

    for node in order {
        report.visited += 1;
        if tree.is_remediated(node) {
            report.already_remediated += 1;
            continue;
        }

        let checks = evaluate(&*tree, node, thresholds);
        if checks.is_empty() {
            continue;
        }
        report.evaluated += 1;

        for check in checks.iter().filter(|c| !c.passes()) {
            match check.kind {
                CheckKind::Text => {
                    let replacement = adjust_for_contrast(check.background, check.required);
                    let overrides = tree.overrides_mut(node);
                    overrides.color = Some(replacement);
                    report.text_fixed += 1;

                    if contrast_ratio(replacement, check.background) < check.required {
                        let forced = farthest_in_lightness(replacement);
                        overrides.background_color = Some(forced);
                        report.background_forced += 1;
                        debug!(
                            node = node.index(),
                            ratio = check.ratio,
                            required = check.required,
                            background = %forced,
                            "forced background for unreachable text contrast"
                        );
                    }
                    debug!(
                        node = node.index(),
                        from = %check.foreground,
                        to = %replacement,
                        ratio = check.ratio,
                        required = check.required,
                        "text color remediated"
                    );
                }
                CheckKind::Border => {
                    let background = tree
                        .overrides(node)
                        .background_color
                        .unwrap_or(check.background);
                    let replacement = adjust_for_contrast(background, check.required);
                    tree.overrides_mut(node).border_color = Some(replacement);
                    report.border_fixed += 1;
                    debug!(
                        node = node.index(),
                        from = %check.foreground,
                        to = %replacement,
                        ratio = check.ratio,
                        "border color remediated"
                    );
                }
            }
            tree.set_remediated(node, true);
        }
    }

    info!(
        visited = report.visited,
        text_fixed = report.text_fixed,
        border_fixed = report.border_fixed,
        background_forced = report.background_forced,
        "remediation pass finished"
    );
    report
}

/// Clears overrides and markers on every marked node; returns how many were
/// reverted. Unmarked nodes are left alone and an already clean tree is a
/// no-op.
pub fn revert<T: NodeMutate>(tree: &mut T) -> usize {
    let marked: Vec<NodeId> = tree
        .descendants()
        .filter(|&n| tree.is_remediated(n))
        .collect();
    for &node in &marked {
        tree.overrides_mut(node).clear();
        tree.set_remediated(node, false);
    }
    if !marked.is_empty() {
        debug!(count = marked.len(), "reverted remediated nodes");
    }
    marked.len()
}

/// Black or white, whichever is farther in CIE lightness from `text`.
fn farthest_in_lightness(text: Color) -> Color {
    let l = text.lightness();
    let to_white = (Color::WHITE.lightness() - l).abs();
    let to_black = (l - Color::BLACK.lightness()).abs();
    if to_white >= to_black {
        Color::WHITE
    } else {
        Color::BLACK
    }
}
