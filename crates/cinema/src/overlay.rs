//! The full-viewport overlay that hosts the relocated container.
//!
//! ```text
//! div#cinema-overlay.cinema-overlay
//! └── div.cinema-overlay__frame
//!     ├── div.cinema-overlay__bar
//!     │   └── button#cinema-close-button.cinema-close   "×"
//!     └── div.cinema-overlay__content                    (content slot)
//! ```

use dom::{Document, DomError, NodeKey};
use log::{debug, warn};

pub const OVERLAY_ID: &str = "cinema-overlay";
pub const CLOSE_BUTTON_ID: &str = "cinema-close-button";

/// Keys of a mounted overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    root: NodeKey,
    close_button: NodeKey,
    content: NodeKey,
}

impl Overlay {
    /// Build the overlay and append it to `<body>` (or the nearest thing the page has).
    pub fn mount(doc: &mut Document) -> Result<Self, DomError> {
        let host = doc
            .body()
            .or_else(|| doc.document_element())
            .unwrap_or_else(|| doc.root());

        let root = element(doc, "div", &[("id", OVERLAY_ID), ("class", "cinema-overlay")])?;
        let frame = element(doc, "div", &[("class", "cinema-overlay__frame")])?;
        let bar = element(doc, "div", &[("class", "cinema-overlay__bar")])?;
        let close_button = element(
            doc,
            "button",
            &[
                ("id", CLOSE_BUTTON_ID),
                ("class", "cinema-close"),
                ("type", "button"),
                ("aria-label", "Close"),
            ],
        )?;
        let glyph = doc.create_text("\u{00d7}");
        let content = element(doc, "div", &[("class", "cinema-overlay__content")])?;

        doc.append_child(close_button, glyph)?;
        doc.append_child(bar, close_button)?;
        doc.append_child(frame, bar)?;
        doc.append_child(frame, content)?;
        doc.append_child(root, frame)?;
        doc.append_child(host, root)?;
        debug!("[cinema] overlay mounted");
        Ok(Self {
            root,
            close_button,
            content,
        })
    }

    pub const fn root(&self) -> NodeKey {
        self.root
    }

    pub const fn close_button(&self) -> NodeKey {
        self.close_button
    }

    /// The element the container is moved into.
    pub const fn content(&self) -> NodeKey {
        self.content
    }

    /// Whether `target` is the close control or something inside it.
    pub fn is_close_target(&self, doc: &Document, target: NodeKey) -> bool {
        doc.contains(self.close_button, target)
    }

    /// Take the overlay off the page.
    ///
    /// Normally the whole subtree is destroyed. If something is still parked in
    /// the content slot (a restore that had nowhere to go), the overlay is only
    /// detached so those nodes stay alive.
    pub fn unmount(self, doc: &mut Document) {
        if !doc.contains_node(self.root) {
            debug!("[cinema] overlay already gone");
            return;
        }
        let result = if doc.children(self.content).is_empty() {
            doc.remove(self.root)
        } else {
            warn!("[cinema] content slot is not empty; detaching overlay instead of destroying it");
            doc.detach(self.root)
        };
        if let Err(err) = result {
            warn!("[cinema] failed to unmount overlay: {err}");
        }
    }
}

fn element(doc: &mut Document, tag: &str, attrs: &[(&str, &str)]) -> Result<NodeKey, DomError> {
    let node = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attribute(node, name, value)?;
    }
    Ok(node)
}
