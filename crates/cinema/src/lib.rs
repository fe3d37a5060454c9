//! Cinema mode: move a page's embedded video player into a full-viewport
//! overlay and put it back exactly where it was.
//!
//! The player's container node is moved rather than recreated, so playback
//! state survives the round trip. While it is away, a placeholder of the same
//! measured size holds its slot in the page.
//!
//! [`RelocationController`] owns the open/closed state and runs every change
//! through [`transition`], which yields the complete side-effect batch for the
//! edge. [`TransplantEngine`] carries those effects out against a
//! [`dom::Document`].

pub mod controller;
pub mod events;
pub mod overlay;
pub mod overrides;
pub mod state;
pub mod styles;
pub mod transplant;
pub mod trigger;

pub use controller::{DEFAULT_TRIGGER_LABEL, RelocationController};
pub use events::{CANCEL_KEY, InputEvent};
pub use overlay::{CLOSE_BUTTON_ID, OVERLAY_ID, Overlay};
pub use overrides::{CONTAINER_OVERRIDES, FRAME_OVERRIDES, StyleOverride};
pub use state::{Effect, Intent, ModalState, Transition, transition};
pub use styles::{OverlayStyles, STYLE_ELEMENT_ID};
pub use transplant::{OriginalLocation, PLACEHOLDER_ID, TransplantEngine};
pub use trigger::TRIGGER_ID;
