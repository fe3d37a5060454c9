//! Moving the live container between the page and the overlay.
//!
//! The container node itself is moved, never cloned, so the embedded player
//! keeps its state. A placeholder with the container's measured size holds
//! its exact slot in the page while it is away.

use dom::{Document, DomError, NodeKey, Priority, Rect};
use log::{debug, info, warn};

use crate::overlay::Overlay;
use crate::overrides::{self, ShadowedStyles};
use crate::trigger;

pub const PLACEHOLDER_ID: &str = "cinema-video-placeholder";

/// Where the container lives in the page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OriginalLocation {
    pub parent: NodeKey,
    /// Sibling index, recorded when a relocation begins.
    pub index: Option<usize>,
}

#[derive(Debug)]
pub struct TransplantEngine {
    container: NodeKey,
    origin: Option<OriginalLocation>,
    trigger: Option<NodeKey>,
    overlay: Option<Overlay>,
    placeholder: Option<NodeKey>,
    /// Present while the overrides are applied.
    shadowed: Option<ShadowedStyles>,
}

impl TransplantEngine {
    /// Capture the container's current parent as its original location.
    pub fn new(doc: &Document, container: NodeKey) -> Self {
        let origin = doc.parent(container).map(|parent| OriginalLocation {
            parent,
            index: doc.index_in_parent(container),
        });
        if origin.is_none() {
            debug!("[cinema] container has no parent; it will not be relocated");
        }
        Self {
            container,
            origin,
            trigger: None,
            overlay: None,
            placeholder: None,
            shadowed: None,
        }
    }

    pub const fn container(&self) -> NodeKey {
        self.container
    }

    pub const fn original_location(&self) -> Option<OriginalLocation> {
        self.origin
    }

    pub const fn trigger(&self) -> Option<NodeKey> {
        self.trigger
    }

    pub const fn set_trigger(&mut self, trigger: Option<NodeKey>) {
        self.trigger = trigger;
    }

    pub const fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub const fn placeholder(&self) -> Option<NodeKey> {
        self.placeholder
    }

    pub fn mount_overlay(&mut self, doc: &mut Document) {
        if self
            .overlay
            .is_some_and(|overlay| doc.is_connected(overlay.root()))
        {
            return;
        }
        match Overlay::mount(doc) {
            Ok(overlay) => self.overlay = Some(overlay),
            Err(err) => warn!("[cinema] failed to mount overlay: {err}"),
        }
    }

    pub fn unmount_overlay(&mut self, doc: &mut Document) {
        if let Some(overlay) = self.overlay.take() {
            overlay.unmount(doc);
        }
    }

    pub fn hide_trigger(&self, doc: &mut Document) {
        let Some(button) = self.trigger else {
            return;
        };
        if let Err(err) = trigger::hide(doc, button) {
            warn!("[cinema] failed to hide trigger: {err}");
        }
    }

    pub fn show_trigger(&self, doc: &mut Document) {
        let Some(button) = self.trigger else {
            return;
        };
        if let Err(err) = trigger::show(doc, button) {
            warn!("[cinema] failed to show trigger: {err}");
        }
    }

    /// Swap a placeholder into the container's slot and move the container
    /// into the overlay's content slot with the overrides forced on.
    pub fn relocate(&mut self, doc: &mut Document) {
        let Some(origin) = self.origin else {
            debug!("[cinema] no original location; leaving container in place");
            return;
        };
        let Some(slot) = self.overlay.map(|overlay| overlay.content()) else {
            warn!("[cinema] overlay is not mounted; nothing to relocate into");
            return;
        };
        if !doc.contains_node(self.container) {
            warn!("[cinema] container no longer exists");
            return;
        }

        let rect = doc.bounding_client_rect(self.container);
        self.discard_stale_placeholders(doc, origin.parent);

        // The page may have moved the container since activation; its slot
        // is wherever it sits now.
        let Some(parent) = doc.parent(self.container) else {
            warn!("[cinema] container was detached from the page; not relocating");
            return;
        };
        if parent != origin.parent {
            debug!("[cinema] container moved since activation; relocating from its new parent");
        }
        self.origin = Some(OriginalLocation {
            parent,
            index: doc.index_in_parent(self.container),
        });

        let placeholder = match create_placeholder(doc, rect) {
            Ok(node) => node,
            Err(err) => {
                warn!("[cinema] failed to build placeholder: {err}");
                return;
            }
        };
        if let Err(err) = doc.replace_child(parent, placeholder, self.container) {
            warn!("[cinema] failed to swap in placeholder: {err}");
            drop(doc.remove(placeholder));
            return;
        }
        self.placeholder = Some(placeholder);

        if let Err(err) = doc.append_child(slot, self.container) {
            warn!("[cinema] failed to move container into overlay: {err}");
            self.put_back(doc, parent, placeholder);
            return;
        }
        self.shadowed = Some(overrides::apply(doc, self.container));
        info!(
            "[cinema] relocated container ({}x{} placeholder)",
            rect.width, rect.height
        );
    }

    /// Strip the overrides and swap the container back over its placeholder.
    pub fn restore(&mut self, doc: &mut Document) {
        let alive = doc.contains_node(self.container);
        if let Some(shadowed) = self.shadowed.take().filter(|_| alive) {
            overrides::clear(doc, self.container, &shadowed);
        }
        let Some(placeholder) = self.placeholder.take().filter(|node| doc.contains_node(*node)) else {
            debug!("[cinema] no placeholder; container was never relocated");
            return;
        };

        match doc.parent(placeholder) {
            _ if !alive => {
                warn!("[cinema] container was destroyed while relocated; dropping its placeholder");
            }
            Some(parent) if doc.is_connected(parent) => {
                if let Err(err) = doc.replace_child(parent, self.container, placeholder) {
                    warn!("[cinema] failed to restore container: {err}");
                    return;
                }
                info!("[cinema] restored container to its original position");
            }
            _ => {
                warn!("[cinema] original parent is gone; container stays in the overlay");
            }
        }
        if let Err(err) = doc.remove(placeholder) {
            warn!("[cinema] failed to destroy placeholder: {err}");
        }
    }

    /// Remove the trigger and overlay this engine created.
    pub fn release(&mut self, doc: &mut Document) {
        if let Some(button) = self.trigger.take().filter(|node| doc.contains_node(*node)) {
            if let Err(err) = doc.remove(button) {
                warn!("[cinema] failed to remove trigger: {err}");
            }
        }
        self.unmount_overlay(doc);
    }

    /// Undo a half-finished relocation.
    fn put_back(&mut self, doc: &mut Document, parent: NodeKey, placeholder: NodeKey) {
        if let Err(err) = doc.replace_child(parent, self.container, placeholder) {
            warn!("[cinema] failed to put container back: {err}");
            return;
        }
        drop(doc.remove(placeholder));
        self.placeholder = None;
    }

    /// A placeholder left over from an earlier cycle must not survive into a
    /// new one. If the container got separated from its slot, it is swapped
    /// back over the leftover first.
    fn discard_stale_placeholders(&mut self, doc: &mut Document, parent: NodeKey) {
        let mut stale = doc.elements_with_id(PLACEHOLDER_ID);
        if let Some(previous) = self.placeholder.take() {
            if doc.contains_node(previous) && !stale.contains(&previous) {
                stale.push(previous);
            }
        }
        for leftover in stale {
            warn!("[cinema] discarding stale placeholder");
            let separated = doc.parent(self.container) != Some(parent);
            if separated && doc.parent(leftover) == Some(parent) {
                if let Err(err) = doc.replace_child(parent, self.container, leftover) {
                    warn!("[cinema] failed to heal container position: {err}");
                }
            }
            if let Err(err) = doc.remove(leftover) {
                warn!("[cinema] failed to remove stale placeholder: {err}");
            }
        }
    }
}

/// An empty block holding the container's measured size.
fn create_placeholder(doc: &mut Document, rect: Rect) -> Result<NodeKey, DomError> {
    let placeholder = doc.create_element("div");
    doc.set_attribute(placeholder, "id", PLACEHOLDER_ID)?;
    doc.set_style_property(placeholder, "width", &format!("{}px", rect.width), Priority::Normal)?;
    doc.set_style_property(placeholder, "height", &format!("{}px", rect.height), Priority::Normal)?;
    Ok(placeholder)
}
