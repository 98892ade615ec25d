use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the menu and its update scheduling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Quiet period before a burst of host events triggers one menu update.
    pub debounce_ms: u64,
    pub parent_title: String,
    pub new_group_title: String,
    /// Prefix marking the most recently used group.
    pub last_used_marker: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            parent_title: "Open in Tab Group".to_string(),
            new_group_title: "New Group...".to_string(),
            last_used_marker: "★".to_string(),
        }
    }
}

impl MenuConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: MenuConfig = serde_json::from_str(r#"{"debounce_ms": 250}"#).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.parent_title, "Open in Tab Group");
        assert_eq!(config.last_used_marker, "★");
    }
}
