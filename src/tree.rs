//! Document tree and the node-accessor interface the engine runs over.
//!
//! The contrast engine never touches a concrete tree directly: it reads
//! through [`NodeAccess`] and writes through [`NodeMutate`]. [`Document`] is
//! the arena implementation built from a [`DomSnapshot`].

use std::collections::HashMap;

use crate::error::{Result, ShadowError};
use crate::selector::{Matchable, SelectorList};
use crate::types::{BoundingBox, ComputedStyle, DomNode, DomSnapshot, StyleOverrides};

/// Tags treated as form/interactive controls.
pub const INTERACTIVE_TAGS: &[&str] = &["input", "textarea", "select", "button"];

/// Subtrees excluded from extracted page text.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Read-only view over a document tree.
pub trait NodeAccess {
    fn roots(&self) -> &[NodeId];
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> &[NodeId];
    fn tag(&self, node: NodeId) -> &str;
    fn style(&self, node: NodeId) -> Option<&ComputedStyle>;
    /// True when the node or any descendant carries non-whitespace text.
    fn has_rendered_text(&self, node: NodeId) -> bool;
    fn overrides(&self, node: NodeId) -> &StyleOverrides;
    fn is_remediated(&self, node: NodeId) -> bool;

    fn is_interactive(&self, node: NodeId) -> bool {
        let tag = self.tag(node);
        INTERACTIVE_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
    }

    /// The node itself followed by its ancestors up to the root.
    fn ancestors_inclusive(&self, node: NodeId) -> AncestorsInclusive<'_, Self>
    where
        Self: Sized,
    {
        AncestorsInclusive {
            tree: self,
            next: Some(node),
        }
    }

    /// Pre-order traversal of every node under every root.
    fn descendants(&self) -> Descendants<'_, Self>
    where
        Self: Sized,
    {
        let mut stack: Vec<NodeId> = self.roots().to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }
}

/// Write access limited to what remediation is allowed to change.
pub trait NodeMutate: NodeAccess {
    fn overrides_mut(&mut self, node: NodeId) -> &mut StyleOverrides;
    fn set_remediated(&mut self, node: NodeId, remediated: bool);
}

pub struct AncestorsInclusive<'a, T> {
    tree: &'a T,
    next: Option<NodeId>,
}

impl<T> Clone for AncestorsInclusive<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            next: self.next,
        }
    }
}

impl<T: NodeAccess> Iterator for AncestorsInclusive<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Explicit-stack pre-order visitor.
pub struct Descendants<'a, T> {
    tree: &'a T,
    stack: Vec<NodeId>,
}

impl<T: NodeAccess> Iterator for Descendants<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(node).iter().rev().copied());
        Some(node)
    }
}

/// One element of a [`Document`].
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub key: String,
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: Option<String>,
    pub rect: BoundingBox,
    pub style: Option<ComputedStyle>,
    pub overrides: StyleOverrides,
    pub remediated: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rendered_text: bool,
}

impl Matchable for ElementNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

/// Arena-backed document built from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub url: Option<String>,
    pub title: Option<String>,
    nodes: Vec<ElementNode>,
    roots: Vec<NodeId>,
    by_key: HashMap<String, NodeId>,
}

impl Document {
    /// Builds the arena, rejecting dangling ids, inconsistent parent/child
    /// links and parent cycles.
    pub fn from_snapshot(snapshot: DomSnapshot) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(snapshot.nodes.len());
        for (idx, node) in snapshot.nodes.iter().enumerate() {
            if by_key.insert(node.id.clone(), NodeId(idx)).is_some() {
                return Err(ShadowError::Config(format!(
                    "Duplicate node id '{}' in snapshot",
                    node.id
                )));
            }
        }

        let lookup = |key: &str, context: &str| -> Result<NodeId> {
            by_key.get(key).copied().ok_or_else(|| {
                ShadowError::Config(format!("Unknown node id '{key}' referenced by {context}"))
            })
        };

        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        let mut roots = Vec::new();
        for (idx, raw) in snapshot.nodes.iter().enumerate() {
            let parent = match &raw.parent {
                Some(p) => Some(lookup(p, &format!("parent of '{}'", raw.id))?),
                None => {
                    roots.push(NodeId(idx));
                    None
                }
            };
            let children = raw
                .children
                .iter()
                .map(|c| lookup(c, &format!("children of '{}'", raw.id)))
                .collect::<Result<Vec<_>>>()?;
            nodes.push(ElementNode {
                key: raw.id.clone(),
                tag: raw.tag.to_ascii_lowercase(),
                attributes: raw.attributes.clone(),
                text: raw.text.clone(),
                rect: raw.bounding_box,
                style: raw.computed_style.clone(),
                overrides: raw.inline_style,
                remediated: raw.remediated,
                parent,
                children,
                rendered_text: false,
            });
        }

        for (idx, node) in nodes.iter().enumerate() {
            for child in &node.children {
                if nodes[child.0].parent != Some(NodeId(idx)) {
                    return Err(ShadowError::Config(format!(
                        "Node '{}' lists '{}' as a child but its parent is {:?}",
                        node.key,
                        nodes[child.0].key,
                        nodes[child.0].parent.map(|p| nodes[p.0].key.as_str())
                    )));
                }
            }
        }

        for node in &nodes {
            if let Some(p) = node.parent {
                let listed = nodes[p.0].children.iter().any(|c| nodes[c.0].key == node.key);
                if !listed {
                    return Err(ShadowError::Config(format!(
                        "Node '{}' names '{}' as parent but is missing from its children",
                        node.key, nodes[p.0].key
                    )));
                }
            }
        }

        for idx in 0..nodes.len() {
            let mut steps = 0usize;
            let mut cursor = nodes[idx].parent;
            while let Some(p) = cursor {
                steps += 1;
                if steps > nodes.len() {
                    return Err(ShadowError::Config(format!(
                        "Parent cycle detected at node '{}'",
                        nodes[idx].key
                    )));
                }
                cursor = nodes[p.0].parent;
            }
        }

        let mut doc = Self {
            url: snapshot.url,
            title: snapshot.title,
            nodes,
            roots,
            by_key,
        };
        doc.compute_rendered_text();
        Ok(doc)
    }

    fn compute_rendered_text(&mut self) {
        let order: Vec<NodeId> = self.descendants().collect();
        for id in order.into_iter().rev() {
            let own = self.nodes[id.0]
                .text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty());
            let from_children = self.nodes[id.0]
                .children
                .iter()
                .any(|c| self.nodes[c.0].rendered_text);
            self.nodes[id.0].rendered_text = own || from_children;
        }
    }

    pub fn to_snapshot(&self) -> DomSnapshot {
        let key = |id: NodeId| self.nodes[id.0].key.clone();
        DomSnapshot {
            url: self.url.clone(),
            title: self.title.clone(),
            nodes: self
                .nodes
                .iter()
                .map(|n| DomNode {
                    id: n.key.clone(),
                    tag: n.tag.clone(),
                    children: n.children.iter().map(|c| key(*c)).collect(),
                    parent: n.parent.map(key),
                    attributes: n.attributes.clone(),
                    text: n.text.clone(),
                    bounding_box: n.rect,
                    computed_style: n.style.clone(),
                    inline_style: n.overrides,
                    remediated: n.remediated,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ElementNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ElementNode {
        &mut self.nodes[id.0]
    }

    /// Looks a node up by its snapshot id.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    /// First node in document order matching `selector`.
    /// Unsupported selector syntax matches nothing.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selectors = SelectorList::parse(selector)?;
        self.descendants().find(|&id| {
            let ancestors = self.ancestors_inclusive(id).skip(1).map(|a| self.node(a));
            selectors.matches(self.node(id), ancestors)
        })
    }

    /// Visible text of the page, one line per text-bearing node.
    pub fn page_text(&self) -> String {
        let mut lines = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if NON_CONTENT_TAGS.contains(&node.tag.as_str()) {
                continue;
            }
            if node.style.as_ref().is_some_and(|s| s.hides_subtree()) {
                continue;
            }
            let visible = node.style.as_ref().map_or(true, |s| s.is_rendered());
            if let Some(text) = node.text.as_deref().map(str::trim).filter(|_| visible) {
                if !text.is_empty() {
                    lines.push(text.to_string());
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
        lines.join("\n")
    }

    /// Number of nodes currently carrying forced overrides.
    pub fn override_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.overrides.is_empty()).count()
    }
}

impl NodeAccess for Document {
    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    fn style(&self, node: NodeId) -> Option<&ComputedStyle> {
        self.nodes[node.0].style.as_ref()
    }

    fn has_rendered_text(&self, node: NodeId) -> bool {
        self.nodes[node.0].rendered_text
    }

    fn overrides(&self, node: NodeId) -> &StyleOverrides {
        &self.nodes[node.0].overrides
    }

    fn is_remediated(&self, node: NodeId) -> bool {
        self.nodes[node.0].remediated
    }
}

impl NodeMutate for Document {
    fn overrides_mut(&mut self, node: NodeId) -> &mut StyleOverrides {
        &mut self.nodes[node.0].overrides
    }

    fn set_remediated(&mut self, node: NodeId, remediated: bool) {
        self.nodes[node.0].remediated = remediated;
    }
}
