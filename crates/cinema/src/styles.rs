//! The stylesheet the trigger and overlay depend on, as an explicitly
//! installed and removed page resource.

use std::borrow::Cow;

use dom::{Document, NodeKey};
use log::{debug, warn};

pub const STYLE_ELEMENT_ID: &str = "cinema-styles";

/// Default rules for `.cinema-trigger`, `.cinema-overlay` and the close control.
pub const OVERLAY_CSS: &str = include_str!("../assets/overlay.css");

#[derive(Clone, Debug)]
pub struct OverlayStyles {
    css: Cow<'static, str>,
}

impl Default for OverlayStyles {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayStyles {
    pub const fn new() -> Self {
        Self {
            css: Cow::Borrowed(OVERLAY_CSS),
        }
    }

    pub fn with_css(css: impl Into<Cow<'static, str>>) -> Self {
        Self { css: css.into() }
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    fn installed_element(doc: &Document) -> Option<NodeKey> {
        doc.get_element_by_id(STYLE_ELEMENT_ID)
            .filter(|node| doc.tag_name(*node) == Some("style"))
    }

    pub fn is_installed(doc: &Document) -> bool {
        Self::installed_element(doc).is_some()
    }

    /// Append a `<style id="cinema-styles">` to `<head>`. Returns `false`
    /// when it was already there or the page has nowhere to put it.
    pub fn install(&self, doc: &mut Document) -> bool {
        if Self::is_installed(doc) {
            return false;
        }
        let Some(host) = doc.head().or_else(|| doc.document_element()) else {
            warn!("[cinema] page has no <head>; overlay styles not installed");
            return false;
        };
        let style = doc.create_element("style");
        let text = doc.create_text(&self.css);
        let attached = doc
            .set_attribute(style, "id", STYLE_ELEMENT_ID)
            .and_then(|()| doc.append_child(style, text))
            .and_then(|()| doc.append_child(host, style));
        if let Err(err) = attached {
            warn!("[cinema] failed to install overlay styles: {err}");
            return false;
        }
        debug!("[cinema] overlay styles installed");
        true
    }

    /// Remove the stylesheet. Returns whether there was one.
    pub fn uninstall(doc: &mut Document) -> bool {
        let Some(style) = Self::installed_element(doc) else {
            return false;
        };
        match doc.remove(style) {
            Ok(()) => true,
            Err(err) => {
                warn!("[cinema] failed to remove overlay styles: {err}");
                false
            }
        }
    }
}
