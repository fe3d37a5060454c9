//! The persisted enablement flag.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Error};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub plugin_enabled: bool,
}

/// Settings stored as JSON at a fixed path.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings. A file that does not exist yet means defaults.
    pub fn load(&self) -> Result<Settings, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("[settings] {} not found; using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(err) => {
                return Err(Error::new(err)
                    .context(format!("reading settings from {}", self.path.display())));
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("parsing settings in {}", self.path.display()))
    }

    pub fn save(&self, settings: &Settings) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing settings to {}", self.path.display()))?;
        debug!("[settings] saved {settings:?}");
        Ok(())
    }
}
