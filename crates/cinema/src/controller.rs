//! Binds a video container to the overlay and drives it through
//! [`transition`](crate::state::transition).

use dom::{Document, NodeKey};
use log::{debug, info, warn};

use crate::events::InputEvent;
use crate::state::{Effect, Intent, ModalState, transition};
use crate::transplant::TransplantEngine;
use crate::trigger;

pub const DEFAULT_TRIGGER_LABEL: &str = "Cinema";

#[derive(Debug)]
struct Binding {
    source: String,
    state: ModalState,
    cancel_armed: bool,
    engine: TransplantEngine,
}

impl Binding {
    fn apply(&mut self, doc: &mut Document, effect: Effect) {
        debug!("[cinema] effect {effect:?}");
        match effect {
            Effect::MountOverlay => self.engine.mount_overlay(doc),
            Effect::HideTrigger => self.engine.hide_trigger(doc),
            Effect::Relocate => self.engine.relocate(doc),
            Effect::ArmCancelKey => self.cancel_armed = true,
            Effect::DisarmCancelKey => self.cancel_armed = false,
            Effect::ShowTrigger => self.engine.show_trigger(doc),
            Effect::Restore => self.engine.restore(doc),
            Effect::UnmountOverlay => self.engine.unmount_overlay(doc),
        }
    }
}

/// Owns the open/closed state for at most one container at a time.
///
/// The controller never styles the container itself; only a relocation
/// forces overrides, and closing removes them again.
#[derive(Debug)]
pub struct RelocationController {
    trigger_label: String,
    binding: Option<Binding>,
}

impl Default for RelocationController {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_LABEL)
    }
}

impl RelocationController {
    pub fn new(trigger_label: impl Into<String>) -> Self {
        Self {
            trigger_label: trigger_label.into(),
            binding: None,
        }
    }

    /// Attach to `container` and reset to `Closed`.
    ///
    /// Rebinding the same container restores it first if it is open. Binding a
    /// different container tears the previous one down. The trigger is created
    /// at most once per container.
    pub fn activate(&mut self, doc: &mut Document, container: NodeKey, source: &str) {
        if self
            .binding
            .as_ref()
            .is_some_and(|binding| binding.engine.container() != container)
        {
            self.teardown(doc);
        }
        if self.state() == ModalState::Open {
            self.dispatch(doc, Intent::Close);
        }

        let mut engine = TransplantEngine::new(doc, container);
        match trigger::ensure(doc, container, &self.trigger_label) {
            Ok(button) => {
                engine.set_trigger(Some(button));
                engine.show_trigger(doc);
            }
            Err(err) => warn!("[cinema] could not attach trigger: {err}"),
        }
        info!("[cinema] bound to container for {source}");
        self.binding = Some(Binding {
            source: source.to_owned(),
            state: ModalState::Closed,
            cancel_armed: false,
            engine,
        });
    }

    pub fn request_open(&mut self, doc: &mut Document) -> bool {
        self.dispatch(doc, Intent::Open)
    }

    pub fn request_close(&mut self, doc: &mut Document) -> bool {
        self.dispatch(doc, Intent::Close)
    }

    /// Close if open, then remove the trigger and overlay and forget the container.
    pub fn teardown(&mut self, doc: &mut Document) {
        if self.binding.is_none() {
            return;
        }
        self.dispatch(doc, Intent::Close);
        if let Some(mut binding) = self.binding.take() {
            binding.engine.release(doc);
            info!("[cinema] released container for {}", binding.source);
        }
    }

    /// React to a click or key press. Returns whether it caused a transition.
    pub fn handle_event(&mut self, doc: &mut Document, event: &InputEvent) -> bool {
        let Some(binding) = self.binding.as_ref() else {
            return false;
        };
        match event {
            InputEvent::KeyDown { .. } => {
                binding.cancel_armed && event.is_cancel() && self.dispatch(doc, Intent::Close)
            }
            InputEvent::Click { target } => {
                let engine = &binding.engine;
                let on_trigger = engine
                    .trigger()
                    .is_some_and(|button| doc.contains(button, *target));
                let on_close = engine
                    .overlay()
                    .is_some_and(|overlay| overlay.is_close_target(doc, *target));
                if on_close {
                    return self.dispatch(doc, Intent::Close);
                }
                if on_trigger {
                    let intent = match binding.state {
                        ModalState::Closed => Intent::Open,
                        ModalState::Open => Intent::Close,
                    };
                    return self.dispatch(doc, intent);
                }
                false
            }
        }
    }

    /// Run one transition: commit the next state, then its whole effect batch.
    fn dispatch(&mut self, doc: &mut Document, intent: Intent) -> bool {
        let Some(binding) = self.binding.as_mut() else {
            debug!("[cinema] {intent:?} ignored: no container bound");
            return false;
        };
        let Some(edge) = transition(binding.state, intent) else {
            debug!("[cinema] {intent:?} ignored while {:?}", binding.state);
            return false;
        };
        binding.state = edge.to;
        for effect in edge.effects {
            binding.apply(doc, *effect);
        }
        true
    }

    pub fn state(&self) -> ModalState {
        self.binding
            .as_ref()
            .map_or(ModalState::Closed, |binding| binding.state)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn source(&self) -> Option<&str> {
        self.binding.as_ref().map(|binding| binding.source.as_str())
    }

    pub fn container(&self) -> Option<NodeKey> {
        self.binding.as_ref().map(|binding| binding.engine.container())
    }

    pub fn engine(&self) -> Option<&TransplantEngine> {
        self.binding.as_ref().map(|binding| &binding.engine)
    }

    pub fn trigger_label(&self) -> &str {
        &self.trigger_label
    }
}
