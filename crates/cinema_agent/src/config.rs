//! Runtime configuration for the page agent.
//!
//! Values can be constructed programmatically or read from `CINEMA_*`
//! environment variables.

use core::time::Duration;
use std::env;
use std::path::PathBuf;

use cinema::DEFAULT_TRIGGER_LABEL;

/// Containers that embed a course or lesson player, tried in order.
pub const DEFAULT_SELECTORS: [&str; 7] = [
    "#video-player",
    ".video-player",
    ".lesson-video",
    ".player-container",
    "[data-video-player]",
    ".wistia_embed",
    ".vimeo-player",
];

pub const DEFAULT_SCAN_DEBOUNCE_MS: u64 = 250;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    /// Quiet period after the last DOM mutation before the page is rescanned.
    pub scan_debounce_ms: u64,
    /// Container selectors, in priority order.
    pub selectors: Vec<String>,
    /// Where the enablement flag is persisted, if anywhere.
    pub settings_path: Option<PathBuf>,
    pub trigger_label: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCAN_DEBOUNCE_MS,
            default_selectors(),
            None,
            DEFAULT_TRIGGER_LABEL,
        )
    }
}

fn default_selectors() -> Vec<String> {
    DEFAULT_SELECTORS.iter().map(|selector| (*selector).to_owned()).collect()
}

impl AgentConfig {
    /// Construct a config. The debounce is at least 1ms and an empty
    /// selector list falls back to [`DEFAULT_SELECTORS`].
    pub fn new(
        scan_debounce_ms: u64,
        selectors: Vec<String>,
        settings_path: Option<PathBuf>,
        trigger_label: impl Into<String>,
    ) -> Self {
        let selectors = if selectors.is_empty() {
            default_selectors()
        } else {
            selectors
        };
        Self {
            scan_debounce_ms: scan_debounce_ms.max(1),
            selectors,
            settings_path,
            trigger_label: trigger_label.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `CINEMA_SCAN_DEBOUNCE_MS`: rescan delay in milliseconds (default: 250)
    /// - `CINEMA_SELECTORS`: comma-separated container selectors
    /// - `CINEMA_SETTINGS_PATH`: settings JSON file
    /// - `CINEMA_TRIGGER_LABEL`: text of the open button (default: "Cinema")
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AgentConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let scan_debounce_ms = lookup("CINEMA_SCAN_DEBOUNCE_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_SCAN_DEBOUNCE_MS);
        let selectors = lookup("CINEMA_SELECTORS")
            .map(|val| {
                val.split(',')
                    .map(str::trim)
                    .filter(|selector| !selector.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let settings_path = lookup("CINEMA_SETTINGS_PATH")
            .filter(|val| !val.is_empty())
            .map(PathBuf::from);
        let trigger_label = lookup("CINEMA_TRIGGER_LABEL")
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGER_LABEL.to_owned());
        Self::new(scan_debounce_ms, selectors, settings_path, trigger_label)
    }

    pub const fn scan_debounce(&self) -> Duration {
        Duration::from_millis(self.scan_debounce_ms)
    }
}
