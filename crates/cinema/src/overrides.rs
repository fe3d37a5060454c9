//! Inline style overrides forced onto the container and its frame while relocated.

use dom::{Declaration, Document, NodeKey, Priority};
use log::warn;

/// One `!important` declaration forced while the overlay is open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StyleOverride {
    pub property: &'static str,
    pub value: &'static str,
}

const fn forced(property: &'static str, value: &'static str) -> StyleOverride {
    StyleOverride { property, value }
}

/// Undo any author sizing (locked aspect ratios, max widths, padding hacks).
pub const CONTAINER_OVERRIDES: [StyleOverride; 8] = [
    forced("width", "100%"),
    forced("height", "100%"),
    forced("max-width", "none"),
    forced("max-height", "none"),
    forced("min-height", "100%"),
    forced("padding", "0"),
    forced("margin", "0"),
    forced("aspect-ratio", "auto"),
];

/// Pin the frame to the container's box regardless of how the page sized it.
pub const FRAME_OVERRIDES: [StyleOverride; 6] = [
    forced("position", "absolute"),
    forced("top", "0"),
    forced("left", "0"),
    forced("width", "100%"),
    forced("height", "100%"),
    forced("max-height", "none"),
];

/// The embedded frame inside the container, if there is one.
pub fn inner_frame(doc: &Document, container: NodeKey) -> Option<NodeKey> {
    doc.first_descendant_by_tag(container, "iframe")
}

/// An author declaration an override replaced, and its slot in the block.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Shadowed {
    node: NodeKey,
    index: usize,
    declaration: Declaration,
}

/// Author declarations that an override shadowed, put back on close.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShadowedStyles {
    saved: Vec<Shadowed>,
}

impl ShadowedStyles {
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }
}

fn apply_set(doc: &mut Document, node: NodeKey, set: &[StyleOverride], shadowed: &mut ShadowedStyles) {
    for entry in set {
        // Overriding an existing property keeps its slot, so the position
        // seen here is the author's.
        let author = doc.style(node).and_then(|style| {
            style
                .iter()
                .position(|decl| decl.property == entry.property)
                .zip(style.declaration(entry.property).cloned())
        });
        if let Some((index, declaration)) = author {
            shadowed.saved.push(Shadowed {
                node,
                index,
                declaration,
            });
        }
        if let Err(err) = doc.set_style_property(node, entry.property, entry.value, Priority::Important) {
            warn!("[cinema] could not force {}: {err}", entry.property);
        }
    }
}

fn clear_set(doc: &mut Document, node: NodeKey, set: &[StyleOverride]) {
    for entry in set {
        if let Err(err) = doc.remove_style_property(node, entry.property) {
            warn!("[cinema] could not remove {}: {err}", entry.property);
        }
    }
}

/// Force the overrides on the container, and on its frame when it has one.
pub fn apply(doc: &mut Document, container: NodeKey) -> ShadowedStyles {
    let mut shadowed = ShadowedStyles::default();
    apply_set(doc, container, &CONTAINER_OVERRIDES, &mut shadowed);
    if let Some(frame) = inner_frame(doc, container) {
        apply_set(doc, frame, &FRAME_OVERRIDES, &mut shadowed);
    }
    shadowed
}

/// Delete every override declaration, then reinstate the author's own.
///
/// Properties are removed, not blanked: a node this never touched before
/// ends with no inline declaration for any of them.
pub fn clear(doc: &mut Document, container: NodeKey, shadowed: &ShadowedStyles) {
    clear_set(doc, container, &CONTAINER_OVERRIDES);
    if let Some(frame) = inner_frame(doc, container) {
        clear_set(doc, frame, &FRAME_OVERRIDES);
    }
    // Ascending slots rebuild each block in its original order.
    let mut saved: Vec<&Shadowed> = shadowed.saved.iter().collect();
    saved.sort_by_key(|entry| entry.index);
    for entry in saved {
        if !doc.contains_node(entry.node) {
            continue;
        }
        let author = &entry.declaration;
        if let Err(err) = doc.insert_style_property(
            entry.node,
            entry.index,
            &author.property,
            &author.value,
            author.priority,
        ) {
            warn!("[cinema] could not reinstate {}: {err}", author.property);
        }
    }
}
