//! What the page agent receives from its host.

use anyhow::{Context as _, Error};
use cinema::InputEvent;
use serde::{Deserialize, Serialize};

/// A message from the extension's settings surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostMessage {
    /// `{"action":"togglePlugin","enabled":true}`
    TogglePlugin { enabled: bool },
}

impl HostMessage {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).with_context(|| format!("decoding host message {text}"))
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything that can wake the agent's run loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    Message(HostMessage),
    /// A message still in wire form; decoded (or rejected) on arrival.
    RawMessage(String),
    /// The page changed somewhere. Rescans are debounced.
    DomMutated,
    Input(InputEvent),
}
