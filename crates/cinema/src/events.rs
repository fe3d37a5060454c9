//! Input the controller reacts to.

use dom::NodeKey;

/// The key that closes the overlay while it is open.
pub const CANCEL_KEY: &str = "Escape";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Click { target: NodeKey },
    KeyDown { key: String },
}

impl InputEvent {
    pub fn key_down(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::KeyDown { key } if key == CANCEL_KEY)
    }
}
