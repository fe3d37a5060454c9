//! The open-trigger button attached inside the video container.

use dom::{Document, DomError, NodeKey, Priority};

pub const TRIGGER_ID: &str = "cinema-open-button";
pub const TRIGGER_CLASS: &str = "cinema-trigger";

/// Return the container's trigger, creating it only when none exists yet.
pub fn ensure(doc: &mut Document, container: NodeKey, label: &str) -> Result<NodeKey, DomError> {
    if let Some(existing) = doc.descendant_by_id(container, TRIGGER_ID) {
        return Ok(existing);
    }
    let button = doc.create_element("button");
    doc.set_attribute(button, "id", TRIGGER_ID)?;
    doc.set_attribute(button, "class", TRIGGER_CLASS)?;
    doc.set_attribute(button, "type", "button")?;
    let text = doc.create_text(label);
    doc.append_child(button, text)?;
    if let Err(err) = doc.append_child(container, button) {
        doc.remove(button)?;
        return Err(err);
    }
    Ok(button)
}

pub fn hide(doc: &mut Document, trigger: NodeKey) -> Result<(), DomError> {
    doc.set_style_property(trigger, "display", "none", Priority::Normal)
}

/// Drop the suppression so the stylesheet decides how the trigger renders.
pub fn show(doc: &mut Document, trigger: NodeKey) -> Result<(), DomError> {
    doc.remove_style_property(trigger, "display").map(drop)
}

pub fn is_hidden(doc: &Document, trigger: NodeKey) -> bool {
    doc.style(trigger)
        .is_some_and(|style| style.get_property_value("display") == "none")
}
