//! HTML5 parsing using html5ever.
//!
//! The page is parsed into an `RcDom` first and then copied into the arena,
//! so the arena never has to implement html5ever's `TreeSink`.

use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use log::{debug, warn};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

use crate::{Document, NodeKey};

impl Document {
    /// Parse a complete HTML document.
    ///
    /// The mutation journal starts empty: building the tree is not reported as updates.
    pub fn parse_html(html: &str) -> Self {
        let rc_dom: RcDom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        for error in rc_dom.errors.iter() {
            debug!("html parse error: {error}");
        }
        let mut doc = Self::empty();
        let root = doc.root();
        for child in rc_dom.document.children.borrow().iter() {
            convert_node(&mut doc, child, root);
        }
        doc.discard_updates();
        doc
    }

    /// Parse a document and resolve relative URLs against `base_url`.
    pub fn parse_html_with_base(html: &str, base_url: Url) -> Self {
        let mut doc = Self::parse_html(html);
        doc.set_base_url(Some(base_url));
        doc
    }
}

/// Copy an html5ever node (and its subtree) under `parent`.
fn convert_node(doc: &mut Document, rc_node: &Handle, parent: NodeKey) {
    let created = match &rc_node.data {
        RcNodeData::Document => {
            for child in rc_node.children.borrow().iter() {
                convert_node(doc, child, parent);
            }
            return;
        }
        RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => return,
        RcNodeData::Text { contents } => {
            let text = contents.borrow();
            doc.create_text(&text)
        }
        RcNodeData::Comment { contents } => doc.create_comment(contents),
        RcNodeData::Element { name, attrs, .. } => {
            let node = doc.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                if let Err(err) = doc.set_attribute(node, &attr.name.local, &attr.value) {
                    warn!("dropping attribute {}: {err}", &*attr.name.local);
                }
            }
            node
        }
    };
    if let Err(err) = doc.append_child(parent, created) {
        warn!("dropping node that cannot be attached: {err}");
        return;
    }
    for child in rc_node.children.borrow().iter() {
        convert_node(doc, child, created);
    }
}
