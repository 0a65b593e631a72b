// Configuration models for Remindo
// Global config stored as frontmatter in ~/.remindo/config.md

use serde::{Deserialize, Serialize};
use super::common::Priority;

/// All settings (stored in global config.md)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub defaultColor: String,
    pub defaultPriority: Priority,
    pub notificationsEnabled: bool,
    pub notificationTitle: String,
    pub tickIntervalSecs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storagePath: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaultColor: "#5A9".to_string(),
            defaultPriority: Priority::Medium,
            notificationsEnabled: true,
            notificationTitle: "Task reminder".to_string(),
            tickIntervalSecs: 1,
            storagePath: None,
        }
    }
}
