use indextree::{Arena, Node, NodeId};
use log::debug;
use smallvec::SmallVec;
use style_attr::{InlineStyle, Priority};
use tokio::sync::broadcast;
use url::Url;

use crate::error::DomError;

mod printing;
pub mod query;
pub mod updating;

use updating::{DOMSubscriber, DOMUpdate};

/// Stable handle for a node in a [`Document`].
///
/// A key stays valid for as long as the node is alive, no matter how often the
/// node is detached and re-inserted elsewhere. Keys of removed nodes are
/// reported as [`DomError::MissingNode`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeKey(NodeId);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

/// Rendered geometry of an element in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect at the origin with the given size.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    /// Attributes other than `style`, in insertion order.
    pub attrs: SmallVec<[(String, String); 4]>,
    /// Parsed `style` attribute.
    pub style: InlineStyle,
    /// Geometry reported by the host; `None` until laid out.
    pub layout_box: Option<Rect>,
}

impl DomNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            ..Self::default()
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct Document {
    dom: Arena<DomNode>,
    root: NodeId,
    base_url: Option<Url>,
    pending: Vec<DOMUpdate>,
    update_sender: Option<broadcast::Sender<Vec<DOMUpdate>>>,
    subscribers: Vec<Box<dyn DOMSubscriber>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding an empty `<html><head></head><body></body></html>` skeleton.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.dom.new_node(DomNode::element("html"));
        let head = doc.dom.new_node(DomNode::element("head"));
        let body = doc.dom.new_node(DomNode::element("body"));
        doc.root.append(html, &mut doc.dom);
        html.append(head, &mut doc.dom);
        html.append(body, &mut doc.dom);
        doc
    }

    /// Create a document with nothing but the document node.
    pub fn empty() -> Self {
        let mut dom = Arena::new();
        Self {
            root: dom.new_node(DomNode::default()),
            dom,
            base_url: None,
            pending: Vec::new(),
            update_sender: None,
            subscribers: Vec::new(),
        }
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn set_base_url(&mut self, url: Option<Url>) {
        self.base_url = url;
    }

    /// The document node.
    pub fn root(&self) -> NodeKey {
        NodeKey(self.root)
    }

    fn live(&self, key: NodeKey) -> Result<NodeId, DomError> {
        if self.dom.get(key.0).is_none() || key.0.is_removed(&self.dom) {
            return Err(DomError::MissingNode(key));
        }
        Ok(key.0)
    }

    /// Look up a live node.
    pub fn node(&self, key: NodeKey) -> Option<&DomNode> {
        let id = self.live(key).ok()?;
        self.dom.get(id).map(Node::get)
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut DomNode, DomError> {
        let id = self.live(key)?;
        self.dom
            .get_mut(id)
            .map(Node::get_mut)
            .ok_or(DomError::MissingNode(key))
    }

    fn element_mut(&mut self, key: NodeKey) -> Result<&mut DomNode, DomError> {
        let node = self.node_mut(key)?;
        if matches!(node.kind, NodeKind::Element { .. }) {
            Ok(node)
        } else {
            Err(DomError::NotAnElement(key))
        }
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.live(key).is_ok()
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        self.node(key)
            .is_some_and(|node| matches!(node.kind, NodeKind::Element { .. }))
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        self.node(key).and_then(DomNode::tag)
    }

    // ---------------------------------------------------------------
    // Tree navigation
    // ---------------------------------------------------------------

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        let id = self.live(key).ok()?;
        self.dom.get(id)?.parent().map(NodeKey)
    }

    pub fn children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.live(key).map_or_else(
            |_| Vec::new(),
            |id| id.children(&self.dom).map(NodeKey).collect(),
        )
    }

    /// All descendants of `key` in tree order, excluding `key` itself.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        self.live(key).map_or_else(
            |_| Vec::new(),
            |id| id.descendants(&self.dom).skip(1).map(NodeKey).collect(),
        )
    }

    pub fn index_in_parent(&self, key: NodeKey) -> Option<usize> {
        let parent = self.parent(key)?;
        parent.0.children(&self.dom).position(|child| child == key.0)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let Ok(id) = self.live(node) else {
            return false;
        };
        id.ancestors(&self.dom).any(|candidate| candidate == ancestor.0)
    }

    /// Whether the node is reachable from the document node.
    pub fn is_connected(&self, key: NodeKey) -> bool {
        self.contains(self.root(), key)
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeKey> {
        self.children(self.root())
            .into_iter()
            .find(|child| self.tag_name(*child) == Some("html"))
    }

    pub fn head(&self) -> Option<NodeKey> {
        self.child_of_html("head")
    }

    pub fn body(&self) -> Option<NodeKey> {
        self.child_of_html("body")
    }

    fn child_of_html(&self, tag: &str) -> Option<NodeKey> {
        let html = self.document_element()?;
        self.children(html)
            .into_iter()
            .find(|child| self.tag_name(*child) == Some(tag))
    }

    /// Concatenated text of all text descendants.
    pub fn text_content(&self, key: NodeKey) -> String {
        let Ok(id) = self.live(key) else {
            return String::new();
        };
        let mut out = String::new();
        for descendant in id.descendants(&self.dom) {
            if let Some(NodeKind::Text { text }) = self.dom.get(descendant).map(|node| &node.get().kind) {
                out.push_str(text);
            }
        }
        out
    }

    // ---------------------------------------------------------------
    // Node creation
    // ---------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeKey {
        let node = NodeKey(self.dom.new_node(DomNode::element(tag)));
        self.push_update(DOMUpdate::CreateElement {
            node,
            tag: tag.to_ascii_lowercase(),
        });
        node
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeKey {
        let node = NodeKey(self.dom.new_node(DomNode {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            ..DomNode::default()
        }));
        self.push_update(DOMUpdate::CreateText {
            node,
            text: text.to_owned(),
        });
        node
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeKey {
        NodeKey(self.dom.new_node(DomNode {
            kind: NodeKind::Comment {
                text: text.to_owned(),
            },
            ..DomNode::default()
        }))
    }

    // ---------------------------------------------------------------
    // Tree mutation
    // ---------------------------------------------------------------

    fn check_can_adopt(&self, parent: NodeKey, child: NodeKey) -> Result<(NodeId, NodeId), DomError> {
        let parent_id = self.live(parent)?;
        let child_id = self.live(child)?;
        if child_id == self.root {
            return Err(DomError::HierarchyRequest(String::from(
                "the document node cannot be moved",
            )));
        }
        if matches!(
            self.node(parent).map(|node| &node.kind),
            Some(NodeKind::Text { .. } | NodeKind::Comment { .. })
        ) {
            return Err(DomError::HierarchyRequest(format!(
                "{parent:?} cannot have children"
            )));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{child:?} is an inclusive ancestor of {parent:?}"
            )));
        }
        Ok((parent_id, child_id))
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        let (parent_id, child_id) = self.check_can_adopt(parent, child)?;
        child_id.detach(&mut self.dom);
        parent_id
            .checked_append(child_id, &mut self.dom)
            .map_err(|err| DomError::HierarchyRequest(err.to_string()))?;
        let pos = self.index_in_parent(child).unwrap_or(usize::MAX);
        self.push_update(DOMUpdate::InsertNode {
            parent,
            node: child,
            pos,
        });
        Ok(())
    }

    /// Move `child` into `parent` before `reference`, or at the end when `reference` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        reference: Option<NodeKey>,
    ) -> Result<(), DomError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        if reference == child {
            return Ok(());
        }
        let (_, child_id) = self.check_can_adopt(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        child_id.detach(&mut self.dom);
        reference
            .0
            .checked_insert_before(child_id, &mut self.dom)
            .map_err(|err| DomError::HierarchyRequest(err.to_string()))?;
        let pos = self.index_in_parent(child).unwrap_or(usize::MAX);
        self.push_update(DOMUpdate::InsertNode {
            parent,
            node: child,
            pos,
        });
        Ok(())
    }

    /// Put `new_child` where `old_child` is, detaching `old_child`.
    ///
    /// This is a single journaled mutation: observers see one
    /// [`DOMUpdate::ReplaceNode`], never a transient state where the slot is empty.
    pub fn replace_child(
        &mut self,
        parent: NodeKey,
        new_child: NodeKey,
        old_child: NodeKey,
    ) -> Result<(), DomError> {
        if self.parent(old_child) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: old_child,
            });
        }
        if new_child == old_child {
            return Ok(());
        }
        let (_, new_id) = self.check_can_adopt(parent, new_child)?;
        let old_id = old_child.0;
        new_id.detach(&mut self.dom);
        old_id
            .checked_insert_before(new_id, &mut self.dom)
            .map_err(|err| DomError::HierarchyRequest(err.to_string()))?;
        old_id.detach(&mut self.dom);
        self.push_update(DOMUpdate::ReplaceNode {
            parent,
            old: old_child,
            new: new_child,
        });
        Ok(())
    }

    /// Detach a node from its parent, keeping it (and its key) alive.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), DomError> {
        let id = self.live(key)?;
        if self.parent(key).is_none() {
            return Ok(());
        }
        id.detach(&mut self.dom);
        self.push_update(DOMUpdate::DetachNode { node: key });
        Ok(())
    }

    /// Destroy a node and its whole subtree. Their keys become invalid.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        let id = self.live(key)?;
        if id == self.root {
            return Err(DomError::HierarchyRequest(String::from(
                "the document node cannot be removed",
            )));
        }
        id.remove_subtree(&mut self.dom);
        self.push_update(DOMUpdate::RemoveNode { node: key });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------

    /// Read an attribute. `style` is serialized from the inline declaration
    /// block and is absent when the block is empty.
    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<String> {
        let node = self.node(key)?;
        if name.eq_ignore_ascii_case("style") {
            return (!node.style.is_empty()).then(|| node.style.to_css_text());
        }
        node.attr(&name.to_ascii_lowercase()).map(str::to_owned)
    }

    pub fn has_attribute(&self, key: NodeKey, name: &str) -> bool {
        self.attribute(key, name).is_some()
    }

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let node = self.element_mut(key)?;
        if name == "style" {
            node.style = InlineStyle::parse(value);
        } else if let Some(slot) = node.attrs.iter_mut().find(|(attr_name, _)| *attr_name == name) {
            value.clone_into(&mut slot.1);
        } else {
            node.attrs.push((name.clone(), value.to_owned()));
        }
        self.push_update(DOMUpdate::SetAttr {
            node: key,
            name,
            value: value.to_owned(),
        });
        Ok(())
    }

    /// Remove an attribute, returning whether it was present.
    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<bool, DomError> {
        let name = name.to_ascii_lowercase();
        let node = self.element_mut(key)?;
        let removed = if name == "style" {
            let had_style = !node.style.is_empty();
            node.style = InlineStyle::new();
            had_style
        } else {
            let before = node.attrs.len();
            node.attrs.retain(|(attr_name, _)| *attr_name != name);
            node.attrs.len() != before
        };
        if removed {
            self.push_update(DOMUpdate::RemoveAttr { node: key, name });
        }
        Ok(removed)
    }

    pub fn id(&self, key: NodeKey) -> Option<&str> {
        self.node(key)?.attr("id")
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.node(key)
            .and_then(|node| node.attr("class"))
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }

    // ---------------------------------------------------------------
    // Inline style
    // ---------------------------------------------------------------

    pub fn style(&self, key: NodeKey) -> Option<&InlineStyle> {
        self.node(key).map(|node| &node.style)
    }

    /// `element.style.setProperty(property, value, priority)`.
    pub fn set_style_property(
        &mut self,
        key: NodeKey,
        property: &str,
        value: &str,
        priority: Priority,
    ) -> Result<(), DomError> {
        let changed = self
            .element_mut(key)?
            .style
            .set_property(property, value, priority);
        if changed {
            self.push_update(DOMUpdate::SetStyle {
                node: key,
                property: property.to_ascii_lowercase(),
                value: value.to_owned(),
                priority,
            });
        }
        Ok(())
    }

    /// Like [`Self::set_style_property`], but the declaration lands at
    /// `index` in block order instead of the end.
    pub fn insert_style_property(
        &mut self,
        key: NodeKey,
        index: usize,
        property: &str,
        value: &str,
        priority: Priority,
    ) -> Result<(), DomError> {
        let changed = self
            .element_mut(key)?
            .style
            .insert_property(index, property, value, priority);
        if changed {
            self.push_update(DOMUpdate::SetStyle {
                node: key,
                property: property.to_ascii_lowercase(),
                value: value.to_owned(),
                priority,
            });
        }
        Ok(())
    }

    /// `element.style.removeProperty(property)`: deletes the declaration.
    /// Returns the removed value, or `None` if nothing was declared.
    pub fn remove_style_property(
        &mut self,
        key: NodeKey,
        property: &str,
    ) -> Result<Option<String>, DomError> {
        let removed = self.element_mut(key)?.style.remove_property(property);
        if removed.is_some() {
            self.push_update(DOMUpdate::RemoveStyle {
                node: key,
                property: property.to_ascii_lowercase(),
            });
        }
        Ok(removed)
    }

    // ---------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------

    /// Record the rendered box of an element, as reported by the host's layout.
    pub fn set_layout_box(&mut self, key: NodeKey, rect: Rect) -> Result<(), DomError> {
        self.node_mut(key)?.layout_box = Some(rect);
        Ok(())
    }

    /// `element.getBoundingClientRect()`. Nodes without a reported box
    /// measure as an empty rect.
    pub fn bounding_client_rect(&self, key: NodeKey) -> Rect {
        self.node(key)
            .and_then(|node| node.layout_box)
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Mutation journal
    // ---------------------------------------------------------------

    /// Forward flushed batches to a broadcast channel (e.g. for mirrors on other tasks).
    pub fn set_update_sender(&mut self, sender: broadcast::Sender<Vec<DOMUpdate>>) {
        self.update_sender = Some(sender);
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn DOMSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Mutations recorded since the last flush.
    pub fn pending_updates(&self) -> &[DOMUpdate] {
        &self.pending
    }

    /// Forget pending mutations without delivering them.
    pub fn discard_updates(&mut self) {
        self.pending.clear();
    }

    fn push_update(&mut self, update: DOMUpdate) {
        self.pending.push(update);
    }

    /// Deliver the pending batch to subscribers and the update sender, and return it.
    pub fn flush(&mut self) -> Vec<DOMUpdate> {
        let batch = core::mem::take(&mut self.pending);
        if batch.is_empty() {
            return batch;
        }
        for subscriber in &mut self.subscribers {
            for update in &batch {
                if let Err(err) = subscriber.apply_update(update) {
                    log::warn!("DOM subscriber rejected {update:?}: {err}");
                }
            }
        }
        if let Some(sender) = &self.update_sender {
            if sender.send(batch.clone()).is_err() {
                debug!("No receivers for DOM update batch of {}", batch.len());
            }
        }
        batch
    }
}
