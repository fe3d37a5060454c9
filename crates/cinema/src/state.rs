//! The open/closed state machine.
//!
//! A request is turned into at most one [`Transition`]: the next state plus the
//! complete, ordered batch of side effects for that edge. Nothing else decides
//! what happens on open or close.

/// Whether the overlay is showing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

/// What the user (or host) asked for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Open,
    Close,
}

/// One step of a transition's side-effect batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Render the overlay and its content slot.
    MountOverlay,
    /// Suppress the trigger without removing it.
    HideTrigger,
    /// Swap in the placeholder, move the container into the slot, force the overrides.
    Relocate,
    /// Start treating the cancellation key as a close request.
    ArmCancelKey,
    /// Stop reacting to the cancellation key.
    DisarmCancelKey,
    /// Make the trigger visible again.
    ShowTrigger,
    /// Strip the overrides and swap the container back over the placeholder.
    Restore,
    /// Take the overlay out of the page.
    UnmountOverlay,
}

const OPEN_EFFECTS: [Effect; 4] = [
    Effect::MountOverlay,
    Effect::HideTrigger,
    Effect::Relocate,
    Effect::ArmCancelKey,
];

const CLOSE_EFFECTS: [Effect; 4] = [
    Effect::DisarmCancelKey,
    Effect::ShowTrigger,
    Effect::Restore,
    Effect::UnmountOverlay,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: ModalState,
    pub to: ModalState,
    pub effects: &'static [Effect],
}

/// The only edges are Closed→Open and Open→Closed; any other request is ignored.
pub const fn transition(state: ModalState, intent: Intent) -> Option<Transition> {
    match (state, intent) {
        (ModalState::Closed, Intent::Open) => Some(Transition {
            from: ModalState::Closed,
            to: ModalState::Open,
            effects: &OPEN_EFFECTS,
        }),
        (ModalState::Open, Intent::Close) => Some(Transition {
            from: ModalState::Open,
            to: ModalState::Closed,
            effects: &CLOSE_EFFECTS,
        }),
        (ModalState::Closed, Intent::Close) | (ModalState::Open, Intent::Open) => None,
    }
}
