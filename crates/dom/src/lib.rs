//! Arena-backed HTML document model.
//!
//! A [`Document`] owns every node in an `indextree` arena and hands out
//! copyable [`NodeKey`]s. Moving a node between parents keeps its key, so a
//! subtree can be relocated without being recreated. Every mutation is
//! journaled as a [`DOMUpdate`] and delivered in batches by [`Document::flush`].

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod dom;
pub mod error;
pub mod parser;

pub use dom::query::{CompoundSelector, Selector, SelectorList};
pub use dom::updating::{DOMSubscriber, DOMUpdate};
pub use dom::{DomNode, Document, NodeKey, NodeKind, Rect};
pub use error::DomError;
pub use style_attr::{Declaration, InlineStyle, Priority};
