//! Minimal CSS selector matching for guide-step targets.
//!
//! Supports `tag`, `#id`, `.class`, `[attr]`, `[attr="value"]`, compounds of
//! those (`button.primary[type="submit"]`), descendant combinators separated
//! by whitespace, and comma-separated selector lists.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<ComplexSelector>);

/// Compound selectors joined by descendant combinators, leftmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector(Vec<Compound>);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

/// What a selector needs to know about an element.
pub trait Matchable {
    fn tag(&self) -> &str;
    fn attributes(&self) -> &HashMap<String, String>;
}

impl SelectorList {
    /// Parses a selector list; `None` when any part is outside the supported
    /// grammar.
    pub fn parse(input: &str) -> Option<Self> {
        let list = input
            .split(',')
            .map(|part| parse_complex(part.trim()))
            .collect::<Option<Vec<_>>>()?;
        if list.is_empty() {
            return None;
        }
        Some(Self(list))
    }

    /// Tests `element`, with `ancestors` ordered nearest-first.
    pub fn matches<'a, M, I>(&self, element: &M, ancestors: I) -> bool
    where
        M: Matchable + 'a,
        I: Iterator<Item = &'a M> + Clone,
    {
        self.0
            .iter()
            .any(|complex| complex.matches(element, ancestors.clone()))
    }
}

impl ComplexSelector {
    fn matches<'a, M, I>(&self, element: &M, mut ancestors: I) -> bool
    where
        M: Matchable + 'a,
        I: Iterator<Item = &'a M>,
    {
        let Some((last, rest)) = self.0.split_last() else {
            return false;
        };
        if !last.matches(element) {
            return false;
        }
        // Greedy nearest-ancestor matching is exact for descendant-only chains.
        for compound in rest.iter().rev() {
            if !ancestors.any(|a| compound.matches(a)) {
                return false;
            }
        }
        true
    }
}

impl Compound {
    fn matches<M: Matchable>(&self, element: &M) -> bool {
        let attrs = element.attributes();

        if let Some(tag) = &self.tag {
            if !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if attrs.get("id").map(String::as_str) != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = attrs.get("class").map(String::as_str).unwrap_or("");
            let has_all = self
                .classes
                .iter()
                .all(|want| class_attr.split_whitespace().any(|c| c == want));
            if !has_all {
                return false;
            }
        }

        self.attributes.iter().all(|(name, expected)| {
            match (attrs.get(name), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

fn parse_complex(input: &str) -> Option<ComplexSelector> {
    let compounds = split_outside_brackets(input)
        .into_iter()
        .map(parse_compound)
        .collect::<Option<Vec<_>>>()?;
    if compounds.is_empty() {
        return None;
    }
    Some(ComplexSelector(compounds))
}

/// Splits on whitespace that is not inside `[...]`.
fn split_outside_brackets(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, ch) in input.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&input[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&input[s..]);
    }
    parts
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = input;

    let tag_len = rest.find(['#', '.', '[']).unwrap_or(rest.len());
    if tag_len > 0 {
        let tag = &rest[..tag_len];
        if tag != "*" {
            if !is_ident(tag) {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_len..];
    }

    while let Some(first) = rest.chars().next() {
        match first {
            '#' | '.' => {
                let body = &rest[1..];
                let end = body.find(['#', '.', '[']).unwrap_or(body.len());
                let name = &body[..end];
                if !is_ident(name) {
                    return None;
                }
                if first == '#' {
                    compound.id = Some(name.to_string());
                } else {
                    compound.classes.push(name.to_string());
                }
                rest = &body[end..];
            }
            '[' => {
                let close = rest.find(']')?;
                compound.attributes.push(parse_attribute(&rest[1..close])?);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn parse_attribute(body: &str) -> Option<(String, Option<String>)> {
    match body.split_once('=') {
        None => {
            let name = body.trim();
            is_ident(name).then(|| (name.to_ascii_lowercase(), None))
        }
        Some((name, value)) => {
            let name = name.trim();
            if !is_ident(name) {
                return None;
            }
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((name.to_ascii_lowercase(), Some(unquoted.to_string())))
        }
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    struct El {
        tag: &'static str,
        attrs: HashMap<String, String>,
    }

    impl El {
        fn new(tag: &'static str, attrs: &[(&str, &str)]) -> Self {
            Self {
                tag,
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl Matchable for El {
        fn tag(&self) -> &str {
            self.tag
        }
        fn attributes(&self) -> &HashMap<String, String> {
            &self.attrs
        }
    }

    fn matches(selector: &str, el: &El, ancestors: &[El]) -> bool {
        SelectorList::parse(selector)
            .expect("selector should parse")
            .matches(el, ancestors.iter())
    }

    #[test]
    fn matches_simple_selectors() {
        let el = El::new("button", &[("id", "go"), ("class", "btn primary")]);
        assert!(matches("button", &el, &[]));
        assert!(matches("BUTTON", &el, &[]));
        assert!(matches("#go", &el, &[]));
        assert!(matches(".primary", &el, &[]));
        assert!(matches("button.btn.primary#go", &el, &[]));
        assert!(!matches(".secondary", &el, &[]));
        assert!(!matches("#GO", &el, &[]));
        assert!(matches("*", &el, &[]));
    }

    #[test]
    fn matches_attribute_selectors() {
        let el = El::new("input", &[("type", "email"), ("name", "user email")]);
        assert!(matches(r#"input[type="email"]"#, &el, &[]));
        assert!(matches("input[type='email']", &el, &[]));
        assert!(matches("[type=email]", &el, &[]));
        assert!(matches("[name]", &el, &[]));
        assert!(matches(r#"[name="user email"]"#, &el, &[]));
        assert!(!matches(r#"input[type="password"]"#, &el, &[]));
        assert!(!matches("[placeholder]", &el, &[]));
    }

    #[test]
    fn matches_descendant_chains() {
        let el = El::new("input", &[]);
        let ancestors = [
            El::new("div", &[("class", "row")]),
            El::new("form", &[("id", "login")]),
            El::new("body", &[]),
        ];
        assert!(matches("form input", &el, &ancestors));
        assert!(matches("#login .row input", &el, &ancestors));
        assert!(matches("body form input", &el, &ancestors));
        assert!(!matches("section input", &el, &ancestors));
        assert!(!matches(".row #login input", &el, &ancestors));
    }

    #[test]
    fn selector_lists_match_any_member() {
        let el = El::new("a", &[]);
        assert!(matches("button, a", &el, &[]));
        assert!(!matches("button, span", &el, &[]));
    }

    #[test]
    fn rejects_unsupported_grammar() {
        assert!(SelectorList::parse("").is_none());
        assert!(SelectorList::parse("div > p").is_none());
        assert!(SelectorList::parse("a:hover").is_none());
        assert!(SelectorList::parse("input[type").is_none());
        assert!(SelectorList::parse("a,").is_none());
    }
}
