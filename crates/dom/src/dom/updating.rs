use anyhow::Error;
use style_attr::Priority;

use super::NodeKey;

/// A journaled document mutation, delivered to subscribers in batches.
#[derive(Debug, Clone, PartialEq)]
pub enum DOMUpdate {
    CreateElement {
        node: NodeKey,
        tag: String,
    },
    CreateText {
        node: NodeKey,
        text: String,
    },
    /// `node` was moved under `parent` at child index `pos`.
    InsertNode {
        parent: NodeKey,
        node: NodeKey,
        pos: usize,
    },
    /// `new` took the slot of `old` under `parent` in one step.
    ReplaceNode {
        parent: NodeKey,
        old: NodeKey,
        new: NodeKey,
    },
    /// `node` left its parent but is still alive.
    DetachNode {
        node: NodeKey,
    },
    /// `node` and its subtree were destroyed.
    RemoveNode {
        node: NodeKey,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    RemoveAttr {
        node: NodeKey,
        name: String,
    },
    SetStyle {
        node: NodeKey,
        property: String,
        value: String,
        priority: Priority,
    },
    RemoveStyle {
        node: NodeKey,
        property: String,
    },
}

/// A subscriber that receives DOMUpdate values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single DOMUpdate to the subscriber state.
    fn apply_update(&mut self, update: &DOMUpdate) -> Result<(), Error>;
}
