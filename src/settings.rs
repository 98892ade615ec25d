use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tabgroup_menu::MenuConfig;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Write diagnostics to `~/.tabgroup-linker/logs/diagnostics.log`
    pub debug: bool,
    /// Storage profile under `~/.tabgroup-linker/profiles/`
    pub profile: String,
    pub menu: MenuConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            debug: false,
            profile: "default".to_string(),
            menu: MenuConfig::default(),
        }
    }
}

impl AppSettings {
    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tabgroup-linker").join("settings.toml"))
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| {
                if path.exists() {
                    std::fs::read_to_string(&path).ok()
                } else {
                    None
                }
            })
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    /// Malformed files fall back to defaults rather than aborting startup.
    fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
