//! File-backed settings.

use std::path::PathBuf;

use serde::Deserialize;

use libtabnudge::host::{Destination, SettingsProvider};

/// Settings read from `config.toml`, falling back to defaults when the file
/// is absent.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TabnudgeConfig {
    /// Port for the notify endpoint; 0 lets the OS pick.
    pub port: u16,
    pub destination: Destination,
    pub skip_chooser_when_single: bool,
}

impl TabnudgeConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

impl Default for TabnudgeConfig {
    fn default() -> Self {
        Self {
            port: 0,
            destination: Destination::default(),
            skip_chooser_when_single: false,
        }
    }
}

impl SettingsProvider for TabnudgeConfig {
    fn destination(&self) -> Destination {
        self.destination
    }

    fn skip_chooser_when_single(&self) -> bool {
        self.skip_chooser_when_single
    }
}

fn dirs_path() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(config_dir).join("tabnudge")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join("tabnudge")
    } else {
        PathBuf::from("/tmp/tabnudge")
    }
}
