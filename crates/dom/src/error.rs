use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error;

use crate::NodeKey;

/// Error type for document mutations and lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The key does not refer to a live node in this document.
    MissingNode(NodeKey),
    /// The operation needs an element but the node is text, a comment or the document.
    NotAnElement(NodeKey),
    /// `child` is not a child of `parent`.
    NotAChild { parent: NodeKey, child: NodeKey },
    /// The move would make a node its own ancestor, or otherwise break the tree.
    HierarchyRequest(String),
    /// A selector string could not be parsed.
    InvalidSelector(String),
}

impl Display for DomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingNode(key) => write!(f, "MissingNode: {key:?} is not a live node"),
            Self::NotAnElement(key) => write!(f, "NotAnElement: {key:?}"),
            Self::NotAChild { parent, child } => {
                write!(f, "NotAChild: {child:?} is not a child of {parent:?}")
            }
            Self::HierarchyRequest(message) => write!(f, "HierarchyRequest: {message}"),
            Self::InvalidSelector(selector) => write!(f, "InvalidSelector: {selector:?}"),
        }
    }
}

impl Error for DomError {}
