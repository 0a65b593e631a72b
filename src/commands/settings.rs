// Settings commands - global config and theme

use crate::AppState;
use crate::error::{RemindoError, Result};
use crate::models::{Priority, Settings, Theme};
use crate::storage::saveGlobalConfig;

pub fn getSettings(state: &AppState) -> Settings {
    state.storage.currentSettings()
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct UpdateSettingsInput {
    pub defaultColor: Option<String>,
    pub defaultPriority: Option<String>,
    pub notificationsEnabled: Option<bool>,
    pub notificationTitle: Option<String>,
    pub tickIntervalSecs: Option<u64>,
}

/// Update settings in memory and write them to the global config file
pub fn updateSettings(state: &AppState, input: UpdateSettingsInput) -> Result<Settings> {
    tracing::debug!("[updateSettings] Updates: {:?}", input);

    let defaultPriority = match input.defaultPriority.as_deref() {
        Some(p) => Some(Priority::fromInput(p)
            .ok_or_else(|| RemindoError::InvalidInput(format!("Unknown priority: {}", p)))?),
        None => None,
    };
    if input.tickIntervalSecs == Some(0) {
        return Err(RemindoError::InvalidInput("tickIntervalSecs must be at least 1".to_string()));
    }

    let updated = {
        let mut settings = state.storage.settings.write();
        if let Some(defaultColor) = input.defaultColor.filter(|c| !c.trim().is_empty()) {
            settings.defaultColor = defaultColor;
        }
        if let Some(defaultPriority) = defaultPriority {
            settings.defaultPriority = defaultPriority;
        }
        if let Some(notificationsEnabled) = input.notificationsEnabled {
            settings.notificationsEnabled = notificationsEnabled;
        }
        if let Some(notificationTitle) = input.notificationTitle.filter(|t| !t.trim().is_empty()) {
            settings.notificationTitle = notificationTitle;
        }
        if let Some(tickIntervalSecs) = input.tickIntervalSecs {
            settings.tickIntervalSecs = tickIntervalSecs;
        }
        settings.clone()
    };

    saveGlobalConfig(&state.storage.configPath, &updated)?;
    tracing::info!("[updateSettings] Saved {}", state.storage.configPath.display());
    Ok(updated)
}

pub fn getTheme(state: &AppState) -> Result<Theme> {
    state.storage.readTheme()
}

pub fn setTheme(state: &AppState, theme: Theme) -> Result<()> {
    state.storage.saveTheme(theme)
}

pub fn toggleTheme(state: &AppState) -> Result<Theme> {
    let theme = state.storage.readTheme()?.toggled();
    state.storage.saveTheme(theme)?;
    Ok(theme)
}
