//! Effective background lookup.
//!
//! Approximates compositing as "first opaque ancestor wins": partial alpha
//! is not blended, fully transparent layers are skipped.

use crate::color::{is_fully_transparent, parse_color, Color};
use crate::tree::{NodeAccess, NodeId};

/// Background color the text of `node` is drawn on.
///
/// Walks from the node itself up to the root and takes the first background
/// that is neither `transparent` nor zero-alpha. A forced background override
/// on a node of the chain takes precedence over its computed value. Returns
/// white when the whole chain is transparent, and `None` when the first
/// opaque background cannot be parsed (the node cannot be evaluated).
pub fn effective_background<T: NodeAccess>(tree: &T, node: NodeId) -> Option<Color> {
    for id in tree.ancestors_inclusive(node) {
        if let Some(forced) = tree.overrides(id).background_color {
            return Some(forced);
        }
        let Some(bg) = tree
            .style(id)
            .and_then(|s| s.background_color.as_deref())
            .map(str::trim)
            .filter(|bg| !bg.is_empty())
        else {
            continue;
        };
        if is_fully_transparent(bg) {
            continue;
        }
        return parse_color(bg);
    }
    Some(Color::WHITE)
}
