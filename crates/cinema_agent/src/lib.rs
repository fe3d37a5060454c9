//! Host side of cinema mode: finds the embedded player on a page, keeps the
//! enablement flag, and feeds messages, DOM changes and input to the
//! relocation controller.

pub mod agent;
pub mod config;
pub mod messages;
pub mod scanner;
pub mod settings;

pub use agent::PageAgent;
pub use config::{AgentConfig, DEFAULT_SELECTORS};
pub use messages::{AgentEvent, HostMessage};
pub use scanner::{ScanResult, Scanner};
pub use settings::{Settings, SettingsStore};
