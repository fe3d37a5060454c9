//! Element lookup: ids, tags and a small selector dialect.
//!
//! Supported selectors are compound selectors built from a type selector (or
//! `*`), `#id`, `.class`, `[attr]` and `[attr=value]`, joined by descendant
//! combinators (whitespace), in comma-separated lists. That covers the
//! container selectors players are usually found by.

use core::str::FromStr;

use super::{Document, NodeKey};
use crate::error::DomError;

/// One compound selector, e.g. `div.player#main[data-embed]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, Option<String>)>,
}

/// Compound selectors joined by descendant combinators, leftmost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<CompoundSelector>,
}

/// A comma-separated selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

fn is_ident_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '-' || character == '_'
}

fn take_ident<'src>(input: &'src str, source: &str) -> Result<(&'src str, &'src str), DomError> {
    let end = input
        .char_indices()
        .find(|(_, character)| !is_ident_char(*character))
        .map_or(input.len(), |(index, _)| index);
    if end == 0 {
        return Err(DomError::InvalidSelector(source.to_owned()));
    }
    Ok(input.split_at(end))
}

fn parse_attr(body: &str) -> (String, Option<String>) {
    match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim().trim_matches(|quote| quote == '"' || quote == '\'');
            (name.trim().to_ascii_lowercase(), Some(value.to_owned()))
        }
        None => (body.trim().to_ascii_lowercase(), None),
    }
}

impl CompoundSelector {
    fn parse(text: &str, source: &str) -> Result<Self, DomError> {
        let mut compound = Self::default();
        let mut rest = text;
        if let Some(after_star) = rest.strip_prefix('*') {
            rest = after_star;
        } else if rest.starts_with(is_ident_char) {
            let (tag, after) = take_ident(rest, source)?;
            compound.tag = Some(tag.to_ascii_lowercase());
            rest = after;
        }
        while let Some(marker) = rest.chars().next() {
            let after_marker = &rest[marker.len_utf8()..];
            match marker {
                '#' => {
                    let (id, after) = take_ident(after_marker, source)?;
                    compound.id = Some(id.to_owned());
                    rest = after;
                }
                '.' => {
                    let (class, after) = take_ident(after_marker, source)?;
                    compound.classes.push(class.to_owned());
                    rest = after;
                }
                '[' => {
                    let Some((body, after)) = after_marker.split_once(']') else {
                        return Err(DomError::InvalidSelector(source.to_owned()));
                    };
                    compound.attrs.push(parse_attr(body));
                    rest = after;
                }
                _ => return Err(DomError::InvalidSelector(source.to_owned())),
            }
        }
        Ok(compound)
    }

    /// Whether `node` (an element) matches this compound.
    pub fn matches(&self, doc: &Document, node: NodeKey) -> bool {
        let Some(element) = doc.node(node) else {
            return false;
        };
        let Some(tag) = element.tag() else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|wanted| wanted != tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| element.attr("id") != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|class| doc.has_class(node, class)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(expected) => doc.attribute(node, name).as_deref() == Some(expected.as_str()),
            None => doc.has_attribute(node, name),
        })
    }
}

impl Selector {
    /// Right-to-left match: the last compound against `node`, the rest against ancestors.
    pub fn matches(&self, doc: &Document, node: NodeKey) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }
        let mut remaining = ancestors.iter().rev().peekable();
        let mut cursor = doc.parent(node);
        while let Some(compound) = remaining.peek() {
            let Some(current) = cursor else {
                return false;
            };
            if compound.matches(doc, current) {
                remaining.next();
            }
            cursor = doc.parent(current);
        }
        true
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let compounds = source
            .split_ascii_whitespace()
            .map(|part| CompoundSelector::parse(part, source))
            .collect::<Result<Vec<_>, _>>()?;
        if compounds.is_empty() {
            return Err(DomError::InvalidSelector(source.to_owned()));
        }
        Ok(Self { compounds })
    }
}

impl SelectorList {
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn matches(&self, doc: &Document, node: NodeKey) -> bool {
        self.selectors.iter().any(|selector| selector.matches(doc, node))
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let selectors = source
            .split(',')
            .map(str::parse::<Selector>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }
}

impl Document {
    /// First element in tree order (from the document node) whose `id` is `id`.
    /// Only connected elements are found, as with `document.getElementById`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.id(*node) == Some(id))
    }

    /// Every connected element carrying `id`, in tree order.
    pub fn elements_with_id(&self, id: &str) -> Vec<NodeKey> {
        self.descendants(self.root())
            .into_iter()
            .filter(|node| self.id(*node) == Some(id))
            .collect()
    }

    /// First descendant of `scope` with the given tag name.
    pub fn first_descendant_by_tag(&self, scope: NodeKey, tag: &str) -> Option<NodeKey> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(scope)
            .into_iter()
            .find(|node| self.tag_name(*node) == Some(tag.as_str()))
    }

    /// First descendant of `scope` whose `id` is `id`. Works on detached subtrees too.
    pub fn descendant_by_id(&self, scope: NodeKey, id: &str) -> Option<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.id(*node) == Some(id))
    }

    /// `scope.querySelector(selectors)`.
    pub fn query_selector(&self, scope: NodeKey, selectors: &str) -> Result<Option<NodeKey>, DomError> {
        let list: SelectorList = selectors.parse()?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .find(|node| list.matches(self, *node)))
    }

    /// `scope.querySelectorAll(selectors)`.
    pub fn query_selector_all(&self, scope: NodeKey, selectors: &str) -> Result<Vec<NodeKey>, DomError> {
        let list: SelectorList = selectors.parse()?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|node| list.matches(self, *node))
            .collect())
    }
}
